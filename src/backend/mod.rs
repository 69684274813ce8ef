//! Boundary to the native inference engine

#[cfg(feature = "native")]
pub mod native;

#[cfg(test)]
pub(crate) mod mock;

use std::path::Path;

use crate::config::{ModelConfig, PredictConfig};
use crate::error::Result;

#[cfg(feature = "native")]
pub use native::NativeBackend;

/// Arguments for loading a model into fresh engine state
#[derive(Debug, Clone, Copy)]
pub struct BootstrapRequest<'a> {
    pub model_path: &'a Path,
    pub context_size: i32,
    pub f16_memory: bool,
    pub alpaca: bool,
    pub gpt4all: bool,
}

impl<'a> BootstrapRequest<'a> {
    pub fn new(model_path: &'a Path, config: &ModelConfig) -> Self {
        Self {
            model_path,
            context_size: config.context_size,
            f16_memory: config.f16_memory,
            alpaca: config.alpaca,
            gpt4all: config.gpt4all,
        }
    }
}

/// One generation call as the engine sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictRequest<'a> {
    pub prompt: &'a str,
    pub seed: i32,
    pub threads: i32,
    pub tokens: i32,
    pub top_k: i32,
    pub top_p: f32,
    pub temperature: f32,
    pub penalty: f32,
    pub repeat_last_n: i32,
    pub ignore_eos: bool,
}

impl<'a> PredictRequest<'a> {
    /// Marshal `config`; the token sentinel is expanded here so a literal 0
    /// never reaches the engine
    pub fn new(prompt: &'a str, config: &PredictConfig) -> Self {
        let config = config.normalized();
        Self {
            prompt,
            seed: config.seed,
            threads: config.threads,
            tokens: config.tokens,
            top_k: config.top_k,
            top_p: config.top_p,
            temperature: config.temperature,
            penalty: config.penalty,
            repeat_last_n: config.repeat_last_n,
            ignore_eos: config.ignore_eos,
        }
    }
}

/// Native engine operations a [`Session`](crate::Session) is built on.
///
/// `State` is the opaque engine context. It is moved into
/// [`release_state`](Backend::release_state), so it can be freed only once.
pub trait Backend: Send + Sync {
    type State: Send;

    fn allocate_state(&self) -> Result<Self::State>;

    /// Load weights into `state`; a non-zero status is a failure
    fn bootstrap(&self, state: &mut Self::State, request: &BootstrapRequest<'_>) -> i32;

    /// Blocking single-shot generation returning the raw output or the engine status
    fn predict(&self, state: &mut Self::State, request: &PredictRequest<'_>) -> std::result::Result<String, i32>;

    fn release_state(&self, state: Self::State);
}
