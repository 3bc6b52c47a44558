use std::sync::Arc;
use tubemux_core::{Config, Pipeline};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(config: Config, pipeline: Arc<Pipeline>) -> Self {
        Self { config, pipeline }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        self.pipeline.as_ref()
    }
}
