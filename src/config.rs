// Location: src/config.rs

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};

use crate::error::{EngineError, Result};

/// Model file loaded when nothing else is configured
pub const DEFAULT_MODEL_PATH: &str = "./models/7B/ggml-model-q4_0.bin";

/// Token budget handed to the engine in place of an explicit `0`
pub const UNBOUNDED_TOKENS: i32 = 9_999_999;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the quantized model file
    pub model_path: PathBuf,

    /// Settings fixed at bootstrap
    pub model: ModelConfig,

    /// Sampling settings used as the base for every predict call
    pub predict: PredictConfig,

    /// How the interactive loop groups input lines into prompts
    pub turn_mode: TurnMode,

    /// Default log filter directive (e.g. "info", "llama_bind=debug")
    pub log_level: String,
}

/// Settings the engine needs when loading a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Context window size in tokens
    pub context_size: i32,

    /// Keep the KV memory in half precision
    pub f16_memory: bool,

    /// Alpaca prompt dialect
    pub alpaca: bool,

    /// GPT4All prompt dialect
    pub gpt4all: bool,
}

/// Named top-k default; the engine builds disagree on which one to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopKProfile {
    /// top_k 40, top_p 0.95, temp 0.80, penalty 1.30
    Interactive,
    /// top_k 10000, top_p 0.90, temp 0.96, penalty 1.0
    Library,
}

impl TopKProfile {
    pub fn top_k(self) -> i32 {
        match self {
            TopKProfile::Interactive => 40,
            TopKProfile::Library => 10_000,
        }
    }
}

/// Which form of prompt echo is removed from the engine output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EchoTrim {
    /// Only `" " + prompt`
    LeadingSpace,
    /// Only `prompt`
    Exact,
    /// `" " + prompt` first, then `prompt`
    Either,
}

impl EchoTrim {
    /// Strip a leading prompt echo from `output`, if present
    pub fn strip<'a>(self, output: &'a str, prompt: &str) -> &'a str {
        let spaced = || {
            output
                .strip_prefix(' ')
                .and_then(|rest| rest.strip_prefix(prompt))
        };
        let exact = || output.strip_prefix(prompt);

        let stripped = match self {
            EchoTrim::LeadingSpace => spaced(),
            EchoTrim::Exact => exact(),
            EchoTrim::Either => spaced().or_else(exact),
        };
        stripped.unwrap_or(output)
    }
}

/// Sampling settings for one predict call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictConfig {
    /// RNG seed, -1 lets the engine seed from the current time
    pub seed: i32,
    pub threads: i32,
    /// New tokens to predict, 0 means unbounded
    pub tokens: i32,
    pub top_k: i32,
    pub top_p: f32,
    pub temperature: f32,
    pub penalty: f32,
    /// Last n tokens the repetition penalty looks at
    pub repeat_last_n: i32,
    pub ignore_eos: bool,
    pub echo: EchoTrim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnMode {
    /// Lines accumulate until a blank line
    MultiLine,
    /// Every line is a prompt
    SingleLine,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            model: ModelConfig::default(),
            predict: PredictConfig::default(),
            turn_mode: TurnMode::MultiLine,
            log_level: "info".to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            context_size: 512,
            f16_memory: false,
            alpaca: false,
            gpt4all: false,
        }
    }
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            seed: -1,
            threads: host_threads(),
            tokens: 128,
            top_k: 0,
            top_p: 0.0,
            temperature: 0.0,
            penalty: 0.0,
            repeat_last_n: 64,
            ignore_eos: false,
            echo: EchoTrim::Either,
        }
        .with_profile(TopKProfile::Interactive)
    }
}

impl PredictConfig {
    /// Reset the sampling knobs to the defaults of `profile`
    pub fn with_profile(mut self, profile: TopKProfile) -> Self {
        self.top_k = profile.top_k();
        let (top_p, temperature, penalty) = match profile {
            TopKProfile::Interactive => (0.95, 0.80, 1.30),
            TopKProfile::Library => (0.90, 0.96, 1.0),
        };
        self.top_p = top_p;
        self.temperature = temperature;
        self.penalty = penalty;
        self
    }

    /// Replace the `tokens == 0` sentinel with [`UNBOUNDED_TOKENS`]
    pub fn normalized(mut self) -> Self {
        if self.tokens == 0 {
            self.tokens = UNBOUNDED_TOKENS;
        }
        self
    }
}

/// Logical core count of the host
pub fn host_threads() -> i32 {
    i32::try_from(num_cpus::get()).unwrap_or(i32::MAX)
}

impl EngineConfig {
    /// Load a JSON config file; absent fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_path.as_os_str().is_empty() {
            return Err(EngineError::config("model_path", "Model path cannot be empty"));
        }
        Ok(())
    }
}
