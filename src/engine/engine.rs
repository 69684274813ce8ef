use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    backend::Backend,
    config::{EngineConfig, PredictConfig},
    error::Result,
    options::{resolve_predict_config_from, PredictOption},
    params::ParameterStore,
    predict::predict,
    session::{Session, SessionState},
    types::ProcessingOutput,
};

use super::Processor;

/// Main entry point for library callers
pub struct LlamaEngine<B: Backend> {
    pub(super) config: Arc<EngineConfig>,
    pub(super) session: Arc<Session<B>>,
    pub(super) store: Arc<ParameterStore>,
}

impl<B: Backend + 'static> LlamaEngine<B> {
    /// Configuration the engine was built with, options applied
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session<B>> {
        &self.session
    }

    /// Runtime-editable parameters used by [`predict`](Self::predict)
    pub fn parameters(&self) -> &Arc<ParameterStore> {
        &self.store
    }

    /// Get information about the engine's state
    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            model_path: self.config.model_path.clone(),
            context_size: self.config.model.context_size,
            state: self.session.state(),
            settings: self.store.to_string(),
        }
    }

    /// Generate a continuation of `prompt` with the current parameters
    pub async fn predict(&self, prompt: impl Into<String>) -> Result<String> {
        let config = self.store.resolve(&self.config.predict);
        self.run(prompt.into(), config).await
    }

    /// Like [`predict`](Self::predict), with `opts` applied for this call only
    pub async fn predict_with(&self, prompt: impl Into<String>, opts: &[PredictOption]) -> Result<String> {
        let base = self.store.resolve(&self.config.predict);
        let config = resolve_predict_config_from(base, opts);
        self.run(prompt.into(), config).await
    }

    async fn run(&self, prompt: String, config: PredictConfig) -> Result<String> {
        let session = self.session.clone();
        tokio::task::spawn_blocking(move || predict(&*session, &prompt, &config)).await?
    }

    /// Release the engine state
    pub async fn shutdown(self) -> Result<()> {
        self.session.release()?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<B: Backend + 'static> Processor for LlamaEngine<B> {
    async fn process(&self, input: String) -> Result<ProcessingOutput> {
        let start = Instant::now();
        let text = self.predict(input).await?;
        Ok(ProcessingOutput {
            text,
            processing_time: start.elapsed(),
        })
    }

    async fn shutdown(&self) -> Result<()> {
        self.session.release()?;
        Ok(())
    }
}

/// Information about the engine's state
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub model_path: PathBuf,
    pub context_size: i32,
    pub state: SessionState,
    /// Current settings line
    pub settings: String,
}
