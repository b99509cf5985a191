//! Swagger bootstrap: setup options and the document builder.

use serde::Serialize;
use std::collections::BTreeMap;

use shared::ModelSchema;

use crate::openapi::{
    Method, OpenApiComponents, OpenApiDoc, OpenApiInfo, Operation, PathItem, SchemaGenerator,
    SchemaRef, SecurityScheme, Server, Tag,
};

pub const BEARER: &str = "bearer";

/// How the document is published.
#[derive(Debug, Clone, PartialEq)]
pub struct SwaggerSetup {
    /// Mount point; the JSON document is served at `/<url>-json`
    pub url: String,
    pub title: String,
    pub description: String,
    pub tag: Option<String>,
    pub version: String,
    pub servers: Vec<String>,
    pub bearer_auth: bool,
    pub persist_authorization: bool,
}

impl Default for SwaggerSetup {
    fn default() -> Self {
        Self {
            url: "swagger".to_string(),
            title: "API".to_string(),
            description: String::new(),
            tag: None,
            version: "1.0".to_string(),
            servers: Vec::new(),
            bearer_auth: true,
            persist_authorization: true,
        }
    }
}

impl SwaggerSetup {
    pub fn json_path(&self) -> String {
        format!("/{}-json", self.url.trim_matches('/'))
    }

    pub fn options_path(&self) -> String {
        format!("/{}/options", self.url.trim_matches('/'))
    }

    pub fn custom_options(&self) -> SwaggerCustomOptions {
        SwaggerCustomOptions {
            swagger_options: SwaggerUiOptions {
                persist_authorization: self.persist_authorization,
            },
            url: self.json_path(),
        }
    }
}

/// Options handed to a Swagger UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerCustomOptions {
    pub swagger_options: SwaggerUiOptions,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerUiOptions {
    pub persist_authorization: bool,
}

pub struct DocumentBuilder {
    info: OpenApiInfo,
    servers: Vec<Server>,
    tags: Vec<Tag>,
    bearer_auth: bool,
    paths: BTreeMap<String, PathItem>,
    schemas: SchemaGenerator,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            info: OpenApiInfo {
                title: String::new(),
                description: None,
                version: "1.0".to_string(),
            },
            servers: Vec::new(),
            tags: Vec::new(),
            bearer_auth: false,
            paths: BTreeMap::new(),
            schemas: SchemaGenerator::new(),
        }
    }

    pub fn from_setup(setup: &SwaggerSetup) -> Self {
        let mut builder = Self::new()
            .set_title(&setup.title)
            .set_description(&setup.description)
            .set_version(&setup.version);
        if let Some(tag) = &setup.tag {
            builder = builder.add_tag(tag);
        }
        for server in &setup.servers {
            builder = builder.add_server(server);
        }
        if setup.bearer_auth {
            builder = builder.add_bearer_auth();
        }
        builder
    }

    pub fn set_title(mut self, title: &str) -> Self {
        self.info.title = title.to_string();
        self
    }

    pub fn set_description(mut self, description: &str) -> Self {
        self.info.description = if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        };
        self
    }

    pub fn set_version(mut self, version: &str) -> Self {
        self.info.version = version.to_string();
        self
    }

    pub fn add_tag(mut self, name: &str) -> Self {
        let tag = Tag {
            name: name.to_string(),
        };
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn add_server(mut self, url: &str) -> Self {
        self.servers.push(Server {
            url: url.to_string(),
        });
        self
    }

    pub fn add_bearer_auth(mut self) -> Self {
        self.bearer_auth = true;
        self
    }

    /// Register a model as a component schema
    pub fn add_model(mut self, model: &ModelSchema) -> Self {
        self.schemas.register(model);
        self
    }

    /// Reference to a model, registering it first if needed
    pub fn model_ref(&mut self, model: &ModelSchema) -> SchemaRef {
        self.schemas.register(model)
    }

    pub fn add_operation(mut self, path: &str, method: Method, operation: Operation) -> Self {
        self.paths
            .entry(path.to_string())
            .or_default()
            .set(method, operation);
        self
    }

    pub fn build(self) -> OpenApiDoc {
        let schemas = self.schemas.into_schemas();
        let security_schemes = if self.bearer_auth {
            Some(BTreeMap::from([(BEARER.to_string(), SecurityScheme::bearer())]))
        } else {
            None
        };
        let security = if self.bearer_auth {
            vec![BTreeMap::from([(BEARER.to_string(), Vec::new())])]
        } else {
            Vec::new()
        };
        let components = if schemas.is_empty() && security_schemes.is_none() {
            None
        } else {
            Some(OpenApiComponents {
                schemas: if schemas.is_empty() { None } else { Some(schemas) },
                security_schemes,
            })
        };

        OpenApiDoc {
            openapi: "3.0.0".to_string(),
            info: self.info,
            servers: self.servers,
            tags: self.tags,
            paths: self.paths,
            components,
            security,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::to_json;
    use serde_json::{json, Value};
    use shared::{text_field, TextOptions};

    #[test]
    fn test_setup_defaults() {
        let setup = SwaggerSetup::default();
        assert!(setup.bearer_auth);
        assert!(setup.persist_authorization);
        assert_eq!(setup.json_path(), "/swagger-json");
        assert_eq!(setup.options_path(), "/swagger/options");

        let options = serde_json::to_value(setup.custom_options()).unwrap();
        assert_eq!(
            options,
            json!({"swaggerOptions": {"persistAuthorization": true}, "url": "/swagger-json"})
        );
    }

    #[test]
    fn test_bearer_auth_is_optional() {
        let doc = DocumentBuilder::from_setup(&SwaggerSetup {
            bearer_auth: false,
            ..Default::default()
        })
        .build();
        assert!(doc.security.is_empty());
        assert!(doc.components.is_none());

        let doc = DocumentBuilder::from_setup(&SwaggerSetup::default()).build();
        let value: Value = serde_json::from_str(&to_json(&doc).unwrap()).unwrap();
        assert_eq!(value["components"]["securitySchemes"]["bearer"]["scheme"], "bearer");
        assert_eq!(value["security"], json!([{"bearer": []}]));
    }

    #[test]
    fn test_document_with_operation() {
        let model = ModelSchema::new("CreateTagDto").field("name", text_field(TextOptions::default()));
        let mut builder = DocumentBuilder::from_setup(&SwaggerSetup {
            title: "Tags".to_string(),
            tag: Some("tags".to_string()),
            servers: vec!["http://localhost:3001".to_string()],
            ..Default::default()
        });
        let body = builder.model_ref(&model);
        let doc = builder
            .add_operation(
                "/tags",
                Method::Post,
                Operation::new("createTag", "Create a tag")
                    .tag("tags")
                    .json_body(&model)
                    .response(201, "Created", Some(body)),
            )
            .build();

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["info"]["title"], "Tags");
        assert_eq!(value["tags"], json!([{"name": "tags"}]));
        assert_eq!(value["servers"], json!([{"url": "http://localhost:3001"}]));
        assert_eq!(
            value["paths"]["/tags"]["post"]["requestBody"]["content"]["application/json"]["schema"],
            json!({"$ref": "#/components/schemas/CreateTagDto"})
        );
        assert_eq!(
            value["components"]["schemas"]["CreateTagDto"]["required"],
            json!(["name"])
        );
    }
}
