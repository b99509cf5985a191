//! Message catalogs and the translation seam used by the normalizer.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Built-in English messages for every fixed failure key
pub const DEFAULT_EN: &str = include_str!("../i18n/en.json");
/// Built-in Vietnamese messages for every fixed failure key
pub const DEFAULT_VI: &str = include_str!("../i18n/vi.json");

/// Resolves a message key to display text. Unresolved keys come back
/// unchanged.
pub trait Translate {
    fn translate(&self, key: &str) -> String;
}

/// Returns every key as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Translate for Passthrough {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

impl<T: Translate + ?Sized> Translate for &T {
    fn translate(&self, key: &str) -> String {
        (**self).translate(key)
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid catalog JSON for locale {locale}: {source}")]
    Parse {
        locale: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Catalog for locale {0} must be a JSON object")]
    NotAnObject(String),
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Locale-keyed message tables with a fallback locale.
///
/// Nested JSON objects are flattened into dotted keys, so
/// `{"validation": {"DATE_IS_INVALID": "..."}}` provides
/// `validation.DATE_IS_INVALID`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    fallback: String,
    locales: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: normalize_tag(&fallback.into()),
            locales: HashMap::new(),
        }
    }

    /// Catalog preloaded with the built-in `en` and `vi` messages
    pub fn with_defaults(fallback: impl Into<String>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(fallback);
        catalog.add_locale_json("en", DEFAULT_EN)?;
        catalog.add_locale_json("vi", DEFAULT_VI)?;
        Ok(catalog)
    }

    /// Load every `<locale>.json` file of `dir` on top of the built-in
    /// messages
    pub fn load_dir(dir: &Path, fallback: impl Into<String>) -> Result<Self, CatalogError> {
        let mut catalog = Self::with_defaults(fallback)?;
        let entries = fs::read_dir(dir).map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let path = entry
                .map_err(|source| CatalogError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let json = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            catalog.add_locale_json(&locale, &json)?;
            debug!("Loaded message catalog {} from {}", locale, path.display());
        }

        Ok(catalog)
    }

    pub fn add_locale_json(&mut self, locale: &str, json: &str) -> Result<(), CatalogError> {
        let value: Value = serde_json::from_str(json).map_err(|source| CatalogError::Parse {
            locale: locale.to_string(),
            source,
        })?;
        self.add_locale(locale, &value)
    }

    /// Merge a nested JSON object into a locale's table. Later entries
    /// override earlier ones.
    pub fn add_locale(&mut self, locale: &str, messages: &Value) -> Result<(), CatalogError> {
        let Value::Object(_) = messages else {
            return Err(CatalogError::NotAnObject(locale.to_string()));
        };
        let table = self.locales.entry(normalize_tag(locale)).or_default();
        flatten("", messages, table);
        Ok(())
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(&normalize_tag(locale))
    }

    /// Exact lookup in one locale's table. The tag is matched like
    /// [`Catalog::has_locale`] (`EN`, `en_us` and `en-US` are the same) but
    /// does not fall back to another locale.
    pub fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        self.locales
            .get(&normalize_tag(locale))
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }

    /// Translator for one request. `vi-VN` falls back to `vi`, then to the
    /// catalog's fallback locale.
    pub fn locale(&self, tag: &str) -> LocaleTranslator<'_> {
        let tag = normalize_tag(tag);
        let locale = if self.locales.contains_key(&tag) {
            tag
        } else {
            let primary = tag.split('-').next().unwrap_or_default().to_string();
            if self.locales.contains_key(&primary) {
                primary
            } else {
                self.fallback.clone()
            }
        };
        LocaleTranslator {
            catalog: self,
            locale,
        }
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_lowercase()
}

fn flatten(prefix: &str, value: &Value, table: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&path, child, table);
            }
        }
        Value::String(text) => {
            table.insert(prefix.to_string(), text.clone());
        }
        other => warn!("Ignoring non-string catalog entry {}: {}", prefix, other),
    }
}

/// A [`Catalog`] bound to one resolved locale.
#[derive(Debug, Clone)]
pub struct LocaleTranslator<'a> {
    catalog: &'a Catalog,
    locale: String,
}

impl LocaleTranslator<'_> {
    pub fn locale(&self) -> &str {
        &self.locale
    }
}

impl Translate for LocaleTranslator<'_> {
    fn translate(&self, key: &str) -> String {
        self.catalog
            .lookup(&self.locale, key)
            .or_else(|| self.catalog.lookup(&self.catalog.fallback, key))
            .unwrap_or(key)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new("en");
        catalog
            .add_locale("en", &json!({"error": {"fields": {"is_not_empty": "is required"}}, "greeting": "Hello"}))
            .unwrap();
        catalog
            .add_locale("vi", &json!({"error": {"fields": {"is_not_empty": "không được để trống"}}}))
            .unwrap();
        catalog
    }

    #[test]
    fn test_nested_keys_are_flattened() {
        let catalog = catalog();
        assert_eq!(catalog.lookup("en", "error.fields.is_not_empty"), Some("is required"));
        assert_eq!(catalog.lookup("en", "greeting"), Some("Hello"));
    }

    #[test]
    fn test_lookup_matches_tag_case() {
        let mut catalog = catalog();
        catalog.add_locale("en_US", &json!({"color": "color"})).unwrap();
        assert_eq!(catalog.lookup("EN", "greeting"), Some("Hello"));
        assert_eq!(catalog.lookup(" Vi ", "error.fields.is_not_empty"), Some("không được để trống"));
        assert_eq!(catalog.lookup("en-us", "color"), Some("color"));
        assert_eq!(catalog.lookup("en-US", "greeting"), None);
    }

    #[test]
    fn test_locale_resolution() {
        let catalog = catalog();
        assert_eq!(catalog.locale("vi-VN").locale(), "vi");
        assert_eq!(catalog.locale("VI").locale(), "vi");
        assert_eq!(catalog.locale("fr").locale(), "en");
    }

    #[test]
    fn test_fallback_and_unresolved_keys() {
        let catalog = catalog();
        let vi = catalog.locale("vi");
        assert_eq!(vi.translate("error.fields.is_not_empty"), "không được để trống");
        assert_eq!(vi.translate("greeting"), "Hello");
        assert_eq!(vi.translate("Not Found"), "Not Found");
    }

    #[test]
    fn test_rejects_non_object() {
        let mut catalog = Catalog::new("en");
        assert!(matches!(
            catalog.add_locale("en", &json!(["a"])),
            Err(CatalogError::NotAnObject(_))
        ));
        assert!(matches!(
            catalog.add_locale_json("en", "{"),
            Err(CatalogError::Parse { .. })
        ));
    }

    #[test]
    fn test_defaults_cover_fixed_keys() {
        let catalog = Catalog::with_defaults("en").unwrap();
        for key in [
            crate::fields::PHONE_NUMBER_IS_INVALID,
            crate::fields::DATE_IS_INVALID,
            crate::fields::POINT_IS_INVALID,
        ] {
            assert_ne!(catalog.locale("en").translate(key), key);
            assert_ne!(catalog.locale("vi").translate(key), key);
        }
    }

    #[test]
    fn test_load_dir_ignores_other_files() {
        let dir = std::env::temp_dir().join(format!("catalog-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("fr.json"), r#"{"greeting": "Bonjour"}"#).unwrap();
        fs::write(dir.join("notes.txt"), "not a catalog").unwrap();

        let catalog = Catalog::load_dir(&dir, "en").unwrap();
        assert!(catalog.has_locale("fr"));
        assert_eq!(catalog.locale("fr").translate("greeting"), "Bonjour");

        fs::remove_dir_all(&dir).unwrap();
    }
}
