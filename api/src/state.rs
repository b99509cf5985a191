use openapi::OpenApiDoc;
use shared::{Catalog, CatalogError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::config::ApiConfig;
use crate::docs;
use crate::models::User;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub catalog: Arc<Catalog>,
    pub doc: Arc<OpenApiDoc>,
    pub users: Arc<RwLock<Vec<User>>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ApiConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.i18n_dir {
            Some(dir) => Catalog::load_dir(dir, config.default_locale.clone())?,
            None => Catalog::with_defaults(config.default_locale.clone())?,
        };
        let doc = docs::build_document(&config.swagger);
        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            doc: Arc::new(doc),
            users: Arc::new(RwLock::new(Vec::new())),
            started_at: Instant::now(),
        })
    }
}
