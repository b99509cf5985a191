//! Input Validation Module
//!
//! Request types implement [`Validatable`] by pointing at a process-wide
//! [`shared::ModelSchema`]. The extractors run the schema's field rules on
//! the raw input, so handlers receive already transformed values.
//!
//! # Usage
//!
//! ```ignore
//! pub async fn create_user(
//!     ValidatedJson(req): ValidatedJson<CreateUserRequest>,
//! ) -> ApiResult<impl IntoResponse> {
//!     // req is transformed and validated
//! }
//! ```
//!
//! # Validation Error Response
//!
//! When validation fails, a 422 Unprocessable Entity is returned with one
//! localized message per failing field:
//!
//! ```json
//! {
//!   "code": 422,
//!   "timestamp": "2026-02-20T10:30:00.000Z",
//!   "path": "/api/users",
//!   "message": {
//!     "name": "This field is required",
//!     "location.coordinates": "This field must be a number"
//!   }
//! }
//! ```

pub mod extractors;
pub mod requests;

pub use extractors::{validate_value, Validatable, ValidatedJson, ValidatedQuery};
pub use requests::{CreateUserRequest, ListUsersQuery};
