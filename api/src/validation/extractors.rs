//! Custom Axum extractors for validated input
//!
//! `ValidatedJson<T>` and `ValidatedQuery<T>` run the model's field rules
//! against the raw JSON (or query string) before deserializing, so `T` only
//! ever sees transformed values.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shared::ModelSchema;
use tracing::debug;

use crate::error::ApiError;

/// Types that declare their field rules once, process-wide.
///
/// ```ignore
/// static SCHEMA: Lazy<ModelSchema> = Lazy::new(|| {
///     ModelSchema::new("CreateTagDto").field("name", text_field(TextOptions::default()))
/// });
///
/// impl Validatable for CreateTagRequest {
///     fn schema() -> &'static ModelSchema {
///         &SCHEMA
///     }
/// }
/// ```
pub trait Validatable: DeserializeOwned {
    fn schema() -> &'static ModelSchema;
}

/// Validate `value` against `T`'s rules and deserialize the transformed result
pub fn validate_value<T: Validatable>(value: Value) -> Result<T, ApiError> {
    let schema = T::schema();
    let transformed = schema.validate(value).map_err(|failure| {
        debug!(
            model = schema.name(),
            fields = failure.failing_fields(),
            "Validation failed"
        );
        ApiError::Validation(failure)
    })?;
    serde_json::from_value(transformed)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON data: {}", e)))
}

/// JSON body extractor enforcing `T`'s field rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: Validatable + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|err| {
                let message = match err {
                    JsonRejection::JsonDataError(e) => format!("Invalid JSON data: {}", e.body_text()),
                    JsonRejection::JsonSyntaxError(e) => format!("JSON syntax error: {}", e.body_text()),
                    JsonRejection::MissingJsonContentType(_) => {
                        "Content-Type must be application/json".to_string()
                    }
                    JsonRejection::BytesRejection(_) => "Failed to read request body".to_string(),
                    _ => "Invalid JSON payload".to_string(),
                };
                ApiError::bad_request(message)
            })?;

        validate_value(value).map(ValidatedJson)
    }
}

/// Query string extractor enforcing `T`'s field rules. Every parameter
/// arrives as a string; number and date fields coerce them.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: Validatable + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<IndexMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|err| ApiError::bad_request(err.body_text()))?;

        let object: Map<String, Value> = params
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        validate_value(Value::Object(object)).map(ValidatedQuery)
    }
}

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
