//! Declarative field rules for API models.
//!
//! A [`FieldDescriptor`] bundles, for one model field, the transforms applied
//! before validation, the checks enforced and the documentation published
//! for it. Descriptors are attached to a [`ModelSchema`], evaluated against
//! incoming JSON, and any resulting [`ValidationFailureNode`] tree is
//! flattened by [`normalize`] into one localized message per field.
//!
//! ```
//! use serde_json::json;
//! use shared::{normalize, text_field, phone_field, ModelSchema, Passthrough, PhoneOptions, TextOptions};
//!
//! let schema = ModelSchema::new("Contact")
//!     .field("name", text_field(TextOptions { min_length: Some(2), ..Default::default() }))
//!     .field("phone", phone_field(PhoneOptions::default()));
//!
//! let failure = schema.validate(json!({"name": "A", "phone": "123"})).unwrap_err();
//! let messages = normalize(&failure, &Passthrough);
//! assert_eq!(messages["name"], "error.fields.min_length");
//! assert_eq!(messages["phone"], "validation.PHONE_NUMBER_IS_INVALID");
//! ```

pub mod failure;
pub mod fields;
pub mod i18n;
pub mod pagination;
pub mod patterns;
pub mod rules;
pub mod schema;

pub use failure::{
    failure_key, iso_timestamp, normalize, normalize_all, sanitize, snake_case, NormalizedError,
    ValidationFailureNode,
};
pub use fields::*;
pub use i18n::{Catalog, CatalogError, LocaleTranslator, Passthrough, Translate};
pub use pagination::{Page, PaginationQuery};
pub use rules::{Check, DocFragment, EmailFormat, Pattern, PhoneRegion, Rule, Transform};
pub use schema::{ModelSchema, ROOT_PATH};
