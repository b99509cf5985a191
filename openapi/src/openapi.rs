//! OpenAPI 3.0 document types and component-schema generation from model
//! schemas.
//!
//! Field schemas come from the documentation fragments of each field
//! descriptor. Fragments merge by override, the `required` flag moves to the
//! parent object's `required` list, and nested models become `$ref`s to their
//! own component.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use shared::{Check, FieldDescriptor, ModelSchema, Rule};

/// OpenAPI 3.0 root document
#[derive(Debug, Clone, Serialize)]
pub struct OpenApiDoc {
    pub openapi: String,
    pub info: OpenApiInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    pub paths: BTreeMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<OpenApiComponents>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenApiInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl PathItem {
    fn slot(&mut self, method: Method) -> &mut Option<Operation> {
        match method {
            Method::Get => &mut self.get,
            Method::Post => &mut self.post,
            Method::Put => &mut self.put,
            Method::Patch => &mut self.patch,
            Method::Delete => &mut self.delete,
        }
    }

    pub(crate) fn set(&mut self, method: Method, operation: Operation) {
        *self.slot(method) = Some(operation);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Operation {
    pub fn new(operation_id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            summary: summary.into(),
            description: None,
            parameters: Vec::new(),
            request_body: None,
            responses: BTreeMap::new(),
            tags: None,
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    /// JSON request body referencing a registered model
    pub fn json_body(mut self, model: &ModelSchema) -> Self {
        self.request_body = Some(RequestBody {
            required: true,
            content: json_content(SchemaRef::to(model.name())),
        });
        self
    }

    /// One query parameter per field of `model`
    pub fn query(mut self, model: &ModelSchema) -> Self {
        for (name, descriptor) in model.fields() {
            let (schema, required) = field_schema(descriptor);
            self.parameters.push(Parameter {
                name: name.to_string(),
                location: "query".to_string(),
                required,
                schema: SchemaRef::Inline(Box::new(schema)),
            });
        }
        self
    }

    /// Required string path parameter, optionally with a `format`
    pub fn path_param(mut self, name: &str, format: Option<&str>) -> Self {
        self.parameters.push(Parameter {
            name: name.to_string(),
            location: "path".to_string(),
            required: true,
            schema: SchemaRef::Inline(Box::new(Schema {
                r#type: Some("string".to_string()),
                format: format.map(String::from),
                ..Default::default()
            })),
        });
        self
    }

    pub fn response(mut self, status: u16, description: impl Into<String>, schema: Option<SchemaRef>) -> Self {
        self.responses.insert(
            status.to_string(),
            Response {
                description: description.into(),
                content: schema.map(json_content),
            },
        );
        self
    }
}

fn json_content(schema: SchemaRef) -> BTreeMap<String, MediaType> {
    BTreeMap::from([(
        "application/json".to_string(),
        MediaType {
            schema,
            example: None,
        },
    )])
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub schema: SchemaRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaType {
    pub schema: SchemaRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SchemaRef {
    Inline(Box<Schema>),
    Ref {
        #[serde(rename = "$ref")]
        r#ref: String,
    },
}

impl SchemaRef {
    /// Reference to a component schema
    pub fn to(name: &str) -> Self {
        SchemaRef::Ref {
            r#ref: format!("#/components/schemas/{}", sanitize_schema_name(name)),
        }
    }
}

/// A JSON schema object. Keys without a dedicated field (vendor
/// extensions, `pattern` flags and the like) are kept in `extensions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    pub r#type: String,
    pub scheme: String,
    pub bearer_format: String,
}

impl SecurityScheme {
    pub fn bearer() -> Self {
        Self {
            r#type: "http".to_string(),
            scheme: "bearer".to_string(),
            bearer_format: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiComponents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<BTreeMap<String, SecurityScheme>>,
}

/// Collects component schemas for models and the models they embed.
#[derive(Debug, Default)]
pub struct SchemaGenerator {
    schemas: BTreeMap<String, Schema>,
}

impl SchemaGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `model` (and any nested model) as a component schema
    pub fn register(&mut self, model: &ModelSchema) -> SchemaRef {
        let name = sanitize_schema_name(model.name());
        if !self.schemas.contains_key(&name) {
            let schema = self.object_schema(model);
            self.schemas.insert(name.clone(), schema);
        }
        SchemaRef::to(&name)
    }

    fn object_schema(&mut self, model: &ModelSchema) -> Schema {
        let mut properties = BTreeMap::new();
        let mut required = Vec::new();

        for (name, descriptor) in model.fields() {
            let (schema, is_required) = field_schema(descriptor);
            if is_required {
                required.push(name.to_string());
            }
            let property = match nested_model(descriptor) {
                Some(nested) => serde_json::to_value(self.register(nested)),
                None => serde_json::to_value(schema),
            };
            properties.insert(name.to_string(), property.unwrap_or(Value::Null));
        }

        Schema {
            r#type: Some("object".to_string()),
            properties: Some(properties),
            required: if required.is_empty() { None } else { Some(required) },
            ..Default::default()
        }
    }

    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.schemas
    }
}

/// Merged documentation of one field and whether it is required. A fragment
/// that does not fit [`Schema`] is logged and reduced to its `type`.
pub fn field_schema(descriptor: &FieldDescriptor) -> (Schema, bool) {
    let mut fragment = descriptor.documentation();
    let required = match fragment.remove("required") {
        Some(Value::Bool(required)) => required && !descriptor.is_optional(),
        _ => !descriptor.is_optional(),
    };
    let map = fragment.into_map();
    let declared_type = map.get("type").and_then(Value::as_str).map(String::from);
    let schema = match serde_json::from_value(Value::Object(map)) {
        Ok(schema) => schema,
        Err(err) => {
            warn!(kind = ?descriptor.kind(), "Invalid field documentation: {}", err);
            Schema {
                r#type: declared_type,
                ..Default::default()
            }
        }
    };
    (schema, required)
}

fn nested_model(descriptor: &FieldDescriptor) -> Option<&ModelSchema> {
    descriptor.rules().iter().find_map(|rule| match rule {
        Rule::Validate(Check::Nested(model), _) => Some(model.as_ref()),
        _ => None,
    })
}

pub fn sanitize_schema_name(name: &str) -> String {
    let s: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if s.is_empty() {
        "Unnamed".to_string()
    } else {
        s
    }
}

/// Serialize OpenAPI doc to JSON string
pub fn to_json(doc: &OpenApiDoc) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}
