//! OpenAPI 3.0 documentation generated from model field rules.

pub mod openapi;
pub mod swagger;

pub use openapi::{
    field_schema, sanitize_schema_name, to_json, Method, OpenApiDoc, Operation, Schema,
    SchemaGenerator, SchemaRef,
};
pub use swagger::{DocumentBuilder, SwaggerCustomOptions, SwaggerSetup};
