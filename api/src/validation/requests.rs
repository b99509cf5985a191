//! Field rules for API request types
//!
//! Each request type declares its `ModelSchema` once; the same schema drives
//! validation in the extractors and the published OpenAPI components.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use shared::{
    date_field_optional, email_field, enum_field, enum_field_optional, identifier_field_optional,
    number_field_optional, phone_field, point_field_optional, text_field, DateOptions, DocOptions,
    EmailOptions, EnumOptions, IdentifierOptions, ModelSchema, NumberOptions, PaginationQuery,
    PhoneOptions, PointOptions, TextOptions,
};
use uuid::Uuid;

use super::extractors::Validatable;
use crate::models::{GeoPoint, Role};

// ─────────────────────────────────────────────────────────────────────────────
// Constants for validation rules
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum length for a user name
const MIN_NAME_LENGTH: usize = 2;
/// Maximum length for a user name
const MAX_NAME_LENGTH: usize = 50;
/// Maximum accepted age
const MAX_AGE: f64 = 150.0;

fn described(description: &str, example: serde_json::Value) -> DocOptions {
    DocOptions {
        description: Some(description.to_string()),
        example: Some(example),
        ..Default::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CreateUserRequest
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub age: Option<u32>,
    pub birthday: Option<DateTime<Utc>>,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub team_ids: Vec<Uuid>,
}

static CREATE_USER_SCHEMA: Lazy<ModelSchema> = Lazy::new(|| {
    ModelSchema::new("CreateUserDto")
        .field(
            "name",
            text_field(TextOptions {
                doc: described("Display name", json!("Nguyen Van A")),
                min_length: Some(MIN_NAME_LENGTH),
                max_length: Some(MAX_NAME_LENGTH),
                ..Default::default()
            }),
        )
        .field(
            "email",
            email_field(EmailOptions {
                text: TextOptions {
                    doc: described("Login email", json!("user@example.com")),
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
        .field("phone", phone_field(PhoneOptions::default()))
        .field(
            "role",
            enum_field(
                Role::ALL,
                EnumOptions {
                    doc: described("Access role", json!("member")),
                    ..Default::default()
                },
            ),
        )
        .field(
            "age",
            number_field_optional(NumberOptions {
                int: true,
                minimum: Some(0.0),
                maximum: Some(MAX_AGE),
                ..Default::default()
            }),
        )
        .field("birthday", date_field_optional(DateOptions::default()))
        .field("location", point_field_optional(PointOptions::default()))
        .field(
            "teamIds",
            identifier_field_optional(IdentifierOptions {
                each: true,
                ..Default::default()
            }),
        )
});

impl Validatable for CreateUserRequest {
    fn schema() -> &'static ModelSchema {
        &CREATE_USER_SCHEMA
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ListUsersQuery
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub role: Option<Role>,
}

static LIST_USERS_SCHEMA: Lazy<ModelSchema> = Lazy::new(|| {
    let pagination = PaginationQuery::schema();
    pagination
        .fields()
        .fold(ModelSchema::new("ListUsersQuery"), |schema, (name, descriptor)| {
            schema.field(name, descriptor.clone())
        })
        .field("role", enum_field_optional(Role::ALL, EnumOptions::default()))
});

impl Validatable for ListUsersQuery {
    fn schema() -> &'static ModelSchema {
        &LIST_USERS_SCHEMA
    }
}
