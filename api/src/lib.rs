pub mod config;
pub mod docs;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod i18n;
pub mod models;
pub mod observability;
pub mod response;
pub mod routes;
pub mod state;
pub mod validation;

use axum::{middleware, Router};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};

use crate::state::AppState;

/// The application router. The success envelope wraps the API routes only;
/// the Swagger routes serve their documents as-is.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::user_routes())
        .merge(routes::health_routes())
        .layer(middleware::from_fn(response::response_envelope));

    let routes = Router::new()
        .merge(api)
        .merge(routes::swagger_routes(&state.config.swagger));
    with_error_handling(routes, state)
}

/// Fallback, panic recovery and the exception filter around `routes`
fn with_error_handling(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .fallback(handlers::route_not_found)
        .layer(CatchPanicLayer::custom(filter::panic_response))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            filter::exception_filter,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::get,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn explode() -> &'static str {
        panic!("storage offline")
    }

    #[tokio::test]
    async fn test_panic_renders_error_body() {
        let state = AppState::new(ApiConfig::default()).unwrap();
        let router = with_error_handling(Router::new().route("/explode", get(explode)), state);

        let response = router
            .oneshot(Request::get("/explode").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 500);
        assert_eq!(body["path"], "/explode");
        assert_eq!(body["message"], "Internal Server Error");
    }
}
