use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use indexmap::IndexMap;
use serde::Serialize;
use shared::{iso_timestamp, normalize, Passthrough, Translate, ValidationFailureNode};
use uuid::Uuid;

/// Errors surfaced by handlers and extractors.
///
/// The response produced by `into_response` carries the error itself as an
/// extension, so the exception filter can re-render it with the request path
/// and locale.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed for {} field(s)", .0.failing_fields())]
    Validation(ValidationFailureNode),
    #[error("{message}")]
    Http { status: StatusCode, message: String },
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Fields(IndexMap<String, String>),
    Text(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub timestamp: String,
    pub path: String,
    pub message: ErrorMessage,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Http { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body for a request to `path`, messages resolved through
    /// `translator`. Internal errors are reported verbatim.
    pub fn render<T>(&self, path: &str, translator: &T) -> ErrorResponse
    where
        T: Translate + ?Sized,
    {
        let message = match self {
            ApiError::Validation(failure) => ErrorMessage::Fields(normalize(failure, translator)),
            ApiError::Http { message, .. } => ErrorMessage::Text(translator.translate(message)),
            ApiError::Internal(message) => ErrorMessage::Text(message.clone()),
        };
        ErrorResponse {
            code: self.status().as_u16(),
            timestamp: iso_timestamp(),
            path: path.to_string(),
            message,
        }
    }

    pub fn into_response_for<T>(self, path: &str, translator: &T) -> Response
    where
        T: Translate + ?Sized,
    {
        let payload = self.render(path, translator);
        let correlation_id = Uuid::new_v4().to_string();
        let mut response = (self.status(), Json(payload)).into_response();
        if let Ok(value) = HeaderValue::from_str(&correlation_id) {
            response
                .headers_mut()
                .insert(header::HeaderName::from_static("x-correlation-id"), value);
        }
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_for("", &Passthrough)
    }
}

impl From<ValidationFailureNode> for ApiError {
    fn from(failure: ValidationFailureNode) -> Self {
        ApiError::Validation(failure)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
