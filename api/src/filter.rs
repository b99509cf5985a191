//! Exception filter.
//!
//! Handlers and extractors return [`ApiError`], whose default rendering has
//! no request context. This middleware finds the error on the way out and
//! renders it again with the request path and the caller's locale. Error
//! responses produced by the framework itself (unknown methods, rejected
//! extractors) carry no `ApiError` and are rendered from their status.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;
use tracing::{debug, error};

use crate::{error::ApiError, i18n::resolve_locale, state::AppState};

pub async fn exception_filter(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let uri = req.uri().clone();
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let locale = resolve_locale(&uri, req.headers(), &state.config.default_locale);

    let mut response = next.run(req).await;
    let err = match response.extensions_mut().remove::<ApiError>() {
        Some(err) => err,
        None if is_error(response.status()) => from_status(response.status()),
        None => return response,
    };

    match &err {
        ApiError::Validation(failure) => {
            debug!(path = %path, fields = failure.failing_fields(), "Request failed validation")
        }
        ApiError::Internal(message) => error!(path = %path, "Unhandled error: {}", message),
        ApiError::Http { status, message } => debug!(path = %path, status = %status, "{}", message),
    }

    let translator = state.catalog.locale(&locale);
    err.into_response_for(&path, &translator)
}

fn is_error(status: StatusCode) -> bool {
    status.is_client_error() || status.is_server_error()
}

fn from_status(status: StatusCode) -> ApiError {
    ApiError::new(status, status.canonical_reason().unwrap_or("Error"))
}

/// Panic handler for `CatchPanicLayer`. The panic becomes an internal
/// error, which the filter then renders.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Internal Server Error".to_string()
    };
    error!("Handler panicked: {}", message);
    ApiError::internal("Internal Server Error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_uses_reason() {
        let err = from_status(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.to_string(), "Method Not Allowed");
        assert!(!is_error(StatusCode::CREATED));
        assert!(is_error(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn test_panic_response_is_internal() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(
            response.extensions().get::<ApiError>(),
            Some(ApiError::Internal(_))
        ));
    }
}
