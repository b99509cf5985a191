use axum::{routing::get, Router};
use openapi::SwaggerSetup;

use crate::{handlers, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/users/:id", get(handlers::get_user))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health_check))
}

pub fn swagger_routes(setup: &SwaggerSetup) -> Router<AppState> {
    Router::new()
        .route(&setup.json_path(), get(handlers::swagger_json))
        .route(&setup.options_path(), get(handlers::swagger_options))
}
