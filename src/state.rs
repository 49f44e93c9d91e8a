use crate::config::Config;
use crate::services::backend::{self, QueryBackend};
use crate::services::pipeline::QueryPipeline;
use crate::services::template::engine::TemplateEngine;
use anyhow::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<QueryPipeline>,
    pub templates: Arc<TemplateEngine>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        tracing::info!("[STATE] Initializing AppState...");
        tracing::info!("[STATE]   App: {}", config.app_name);
        tracing::info!("[STATE]   Debug: {}", config.debug);
        tracing::info!("[STATE]   Storage: {}", config.storage_path.display());

        let backend = backend::from_config(&config)?;
        Self::with_backend(config, backend)
    }

    /// Build state around an explicit backend.
    pub fn with_backend(config: Config, backend: Arc<dyn QueryBackend>) -> Result<Self> {
        let templates = TemplateEngine::new()?;

        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(QueryPipeline::new(backend)),
            templates: Arc::new(templates),
        })
    }
}
