//! Composable mutators for [`ModelConfig`] and [`PredictConfig`]

use std::fmt;

use crate::config::{EchoTrim, ModelConfig, PredictConfig, TopKProfile};

/// Setter applied to a [`ModelConfig`]
pub struct ModelOption(Box<dyn Fn(&mut ModelConfig) + Send + Sync>);

/// Setter applied to a [`PredictConfig`]
pub struct PredictOption(Box<dyn Fn(&mut PredictConfig) + Send + Sync>);

impl ModelOption {
    pub fn new(f: impl Fn(&mut ModelConfig) + Send + Sync + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn apply(&self, config: &mut ModelConfig) {
        (self.0)(config)
    }
}

impl PredictOption {
    pub fn new(f: impl Fn(&mut PredictConfig) + Send + Sync + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn apply(&self, config: &mut PredictConfig) {
        (self.0)(config)
    }
}

impl fmt::Debug for ModelOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModelOption")
    }
}

impl fmt::Debug for PredictOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PredictOption")
    }
}

/// Sets the context size.
pub fn set_context(size: i32) -> ModelOption {
    ModelOption::new(move |c| c.context_size = size)
}

pub fn enable_f16_memory() -> ModelOption {
    ModelOption::new(|c| c.f16_memory = true)
}

pub fn enable_alpaca() -> ModelOption {
    ModelOption::new(|c| c.alpaca = true)
}

pub fn enable_gpt4all() -> ModelOption {
    ModelOption::new(|c| c.gpt4all = true)
}

/// Sets the random seed for sampling text generation.
pub fn set_seed(seed: i32) -> PredictOption {
    PredictOption::new(move |p| p.seed = seed)
}

/// Sets the number of threads to use for text generation.
pub fn set_threads(threads: i32) -> PredictOption {
    PredictOption::new(move |p| p.threads = threads)
}

/// Sets the number of tokens to generate; 0 means unbounded.
pub fn set_tokens(tokens: i32) -> PredictOption {
    PredictOption::new(move |p| p.tokens = tokens)
}

/// Sets the value for top-K sampling.
pub fn set_top_k(top_k: i32) -> PredictOption {
    PredictOption::new(move |p| p.top_k = top_k)
}

/// Sets the value for nucleus sampling.
pub fn set_top_p(top_p: f32) -> PredictOption {
    PredictOption::new(move |p| p.top_p = top_p)
}

/// Sets the temperature value for text generation.
pub fn set_temperature(temperature: f32) -> PredictOption {
    PredictOption::new(move |p| p.temperature = temperature)
}

/// Sets the repetition penalty for text generation.
pub fn set_penalty(penalty: f32) -> PredictOption {
    PredictOption::new(move |p| p.penalty = penalty)
}

/// Sets how many trailing tokens the repetition penalty looks at.
pub fn set_repeat(repeat_last_n: i32) -> PredictOption {
    PredictOption::new(move |p| p.repeat_last_n = repeat_last_n)
}

pub fn ignore_eos() -> PredictOption {
    PredictOption::new(|p| p.ignore_eos = true)
}

pub fn set_echo_trim(echo: EchoTrim) -> PredictOption {
    PredictOption::new(move |p| p.echo = echo)
}

/// Resets top_k, top_p, temperature and penalty to the profile defaults.
pub fn set_top_k_profile(profile: TopKProfile) -> PredictOption {
    PredictOption::new(move |p| *p = p.with_profile(profile))
}

pub fn resolve_model_config<'a>(opts: impl IntoIterator<Item = &'a ModelOption>) -> ModelConfig {
    resolve_model_config_from(ModelConfig::default(), opts)
}

pub fn resolve_model_config_from<'a>(
    base: ModelConfig,
    opts: impl IntoIterator<Item = &'a ModelOption>,
) -> ModelConfig {
    let mut config = base;
    for opt in opts {
        opt.apply(&mut config);
    }
    config
}

pub fn resolve_predict_config<'a>(opts: impl IntoIterator<Item = &'a PredictOption>) -> PredictConfig {
    resolve_predict_config_from(PredictConfig::default(), opts)
}

/// Apply `opts` in order over `base`, then expand the token sentinel
pub fn resolve_predict_config_from<'a>(
    base: PredictConfig,
    opts: impl IntoIterator<Item = &'a PredictOption>,
) -> PredictConfig {
    let mut config = base;
    for opt in opts {
        opt.apply(&mut config);
    }
    config.normalized()
}
