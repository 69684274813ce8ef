use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    backend::Backend,
    config::EngineConfig,
    error::Result,
    options::{resolve_model_config_from, resolve_predict_config_from, ModelOption, PredictOption},
    params::ParameterStore,
    session::Session,
};

use super::engine::LlamaEngine;

/// Builder for constructing a [`LlamaEngine`] instance
#[derive(Debug)]
pub struct EngineBuilder {
    config: EngineConfig,
    model_options: Vec<ModelOption>,
    predict_options: Vec<PredictOption>,
}

impl EngineBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            model_options: Vec::new(),
            predict_options: Vec::new(),
        }
    }

    /// Set the engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model_path = path.into();
        self
    }

    /// Add a model option, applied after the configured `model` section
    pub fn with_model_option(mut self, option: ModelOption) -> Self {
        self.model_options.push(option);
        self
    }

    /// Add a predict option, applied after the configured `predict` section
    pub fn with_predict_option(mut self, option: PredictOption) -> Self {
        self.predict_options.push(option);
        self
    }

    /// Load the model with `backend` and build the engine instance
    pub async fn build<B: Backend + 'static>(self, backend: B) -> Result<LlamaEngine<B>> {
        self.config.validate()?;

        let mut config = self.config;
        config.model = resolve_model_config_from(config.model, &self.model_options);
        config.predict = resolve_predict_config_from(config.predict, &self.predict_options);

        let model_path = config.model_path.clone();
        let model = config.model;
        let session = tokio::task::spawn_blocking(move || Session::load(backend, model_path, &model)).await??;

        let store = ParameterStore::from_config(&config.predict);

        Ok(LlamaEngine {
            config: Arc::new(config),
            session: Arc::new(session),
            store: Arc::new(store),
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
