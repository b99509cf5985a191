//! Success envelope: `{code, message, data}`.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use tracing::error;

use crate::error::ApiError;

pub const DEFAULT_MESSAGE: &str = "success";

/// Wrap a handler's JSON output. `statusCode` and `message` are lifted out
/// of object bodies; a `null` body stays `null`.
pub fn envelope(status: StatusCode, body: Value) -> Value {
    let (message, data) = match body {
        Value::Null => return Value::Null,
        Value::Object(mut map) => {
            map.remove("statusCode");
            let message = map.remove("message").filter(is_truthy);
            (message, Value::Object(map))
        }
        other => (None, other),
    };
    json!({
        "code": status.as_u16(),
        "message": message.unwrap_or_else(|| Value::from(DEFAULT_MESSAGE)),
        "data": data,
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

pub async fn response_envelope(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if !response.status().is_success()
        || !is_json(&response)
        || response.extensions().get::<ApiError>().is_some()
    {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to buffer response body: {}", e);
            return ApiError::internal("Internal Server Error").into_response();
        }
    };
    let Ok(value) = serde_json::from_slice::<Value>(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };

    match serde_json::to_vec(&envelope(parts.status, value)) {
        Ok(wrapped) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(wrapped))
        }
        Err(e) => {
            error!("Failed to encode response envelope: {}", e);
            ApiError::internal("Internal Server Error").into_response()
        }
    }
}
