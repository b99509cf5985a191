//! The published OpenAPI document.

use openapi::{DocumentBuilder, Method, OpenApiDoc, Operation, SwaggerSetup};

use crate::validation::{CreateUserRequest, ListUsersQuery, Validatable};

const USERS_TAG: &str = "users";

pub fn build_document(setup: &SwaggerSetup) -> OpenApiDoc {
    let create = CreateUserRequest::schema();
    let list = ListUsersQuery::schema();

    DocumentBuilder::from_setup(setup)
        .add_tag(USERS_TAG)
        .add_model(create)
        .add_operation(
            "/api/users",
            Method::Post,
            Operation::new("createUser", "Create a user")
                .tag(USERS_TAG)
                .json_body(create)
                .response(201, "Created", None)
                .response(409, "Email already registered", None)
                .response(422, "Validation failed", None),
        )
        .add_operation(
            "/api/users",
            Method::Get,
            Operation::new("listUsers", "List users")
                .tag(USERS_TAG)
                .query(list)
                .response(200, "One page of users", None)
                .response(422, "Validation failed", None),
        )
        .add_operation(
            "/api/users/{id}",
            Method::Get,
            Operation::new("getUser", "Get a user")
                .tag(USERS_TAG)
                .path_param("id", Some("uuid"))
                .response(200, "The user", None)
                .response(404, "User not found", None),
        )
        .add_operation(
            "/health",
            Method::Get,
            Operation::new("healthCheck", "Health check").response(200, "Service is up", None),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_lists_user_operations() {
        let doc = build_document(&SwaggerSetup::default());
        let value = serde_json::to_value(&doc).unwrap();

        assert!(value["paths"]["/api/users"]["post"].is_object());
        assert!(value["paths"]["/api/users"]["get"].is_object());
        assert_eq!(
            value["paths"]["/api/users/{id}"]["get"]["parameters"][0]["in"],
            json!("path")
        );

        let schemas = &value["components"]["schemas"];
        assert_eq!(
            schemas["CreateUserDto"]["required"],
            json!(["name", "email", "phone", "role"])
        );
        assert_eq!(schemas["CreateUserDto"]["properties"]["email"]["format"], json!("email"));
        assert!(schemas["Coordinate"].is_object());
    }
}
