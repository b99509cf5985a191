use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use shared::Page;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::User,
    state::AppState,
    validation::{CreateUserRequest, ListUsersQuery, ValidatedJson, ValidatedQuery},
};

pub const EMAIL_TAKEN: &str = "error.users.EMAIL_TAKEN";
pub const USER_NOT_FOUND: &str = "error.users.NOT_FOUND";
pub const INVALID_USER_ID: &str = "error.users.INVALID_ID";

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let uptime = state.started_at.elapsed().as_secs();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime,
    }))
}

pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut users = state.users.write().await;
    if users.iter().any(|user| user.email == req.email) {
        return Err(ApiError::conflict(EMAIL_TAKEN));
    }

    let user = User {
        id: Uuid::new_v4(),
        name: req.name,
        email: req.email,
        phone: req.phone,
        role: req.role,
        age: req.age,
        birthday: req.birthday,
        location: req.location,
        team_ids: req.team_ids,
        created_at: Utc::now(),
    };
    users.push(user.clone());
    tracing::info!(user_id = %user.id, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListUsersQuery>,
) -> Json<Page<User>> {
    let users = state.users.read().await;
    let matching: Vec<User> = users
        .iter()
        .filter(|user| query.role.map_or(true, |role| user.role == role))
        .cloned()
        .collect();
    Json(Page::from_slice(&matching, &query.pagination))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::bad_request(INVALID_USER_ID))?;
    let users = state.users.read().await;
    users
        .iter()
        .find(|user| user.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
}

pub async fn swagger_json(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.doc.as_ref().clone())
}

pub async fn swagger_options(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.config.swagger.custom_options())
}

pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
