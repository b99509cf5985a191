//! API configuration module
//! Reads the listening port, locale settings and Swagger setup from the environment

use openapi::SwaggerSetup;
use std::env;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid boolean for {key}: {value}")]
    InvalidFlag { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub default_locale: String,
    /// Directory of `<locale>.json` catalogs, loaded instead of the bundled ones
    pub i18n_dir: Option<PathBuf>,
    pub swagger: SwaggerSetup,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            default_locale: "en".to_string(),
            i18n_dir: None,
            swagger: SwaggerSetup {
                title: "Field Kit API".to_string(),
                ..Default::default()
            },
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("API_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidConfig(format!("Invalid API_PORT {}: {}", raw, e)))?,
            None => defaults.port,
        };

        let default_locale = lookup("DEFAULT_LOCALE")
            .map(|locale| locale.trim().to_lowercase())
            .unwrap_or(defaults.default_locale);
        if default_locale.is_empty() {
            return Err(ConfigError::InvalidConfig("DEFAULT_LOCALE must not be empty".to_string()));
        }

        let i18n_dir = lookup("I18N_DIR").filter(|dir| !dir.is_empty()).map(PathBuf::from);

        let base = defaults.swagger;
        let swagger = SwaggerSetup {
            url: lookup("SWAGGER_URL")
                .map(|url| url.trim_matches('/').to_string())
                .unwrap_or(base.url),
            title: lookup("SWAGGER_TITLE").unwrap_or(base.title),
            description: lookup("SWAGGER_DESCRIPTION").unwrap_or(base.description),
            tag: lookup("SWAGGER_TAG").or(base.tag),
            version: lookup("SWAGGER_VERSION").unwrap_or(base.version),
            servers: lookup("SWAGGER_SERVERS")
                .map(|servers| {
                    servers
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or(base.servers),
            bearer_auth: flag(&lookup, "SWAGGER_BEARER_AUTH", base.bearer_auth)?,
            persist_authorization: flag(
                &lookup,
                "SWAGGER_PERSIST_AUTHORIZATION",
                base.persist_authorization,
            )?,
        };
        if swagger.url.is_empty() {
            return Err(ConfigError::InvalidConfig("SWAGGER_URL must not be empty".to_string()));
        }

        info!(
            "API configuration loaded: port={}, locale={}, swagger=/{}",
            port, default_locale, swagger.url
        );

        Ok(ApiConfig {
            port,
            default_locale,
            i18n_dir,
            swagger,
        })
    }
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag {
                key: key.to_string(),
                value,
            }),
        },
    }
}
