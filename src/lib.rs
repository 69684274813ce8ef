//! llama-bind - control layer around a native quantized LLM runtime
//!
//! This crate holds one long-lived inference [`Session`], a name-addressable
//! [`ParameterStore`] of sampling settings, and the predict pipeline that
//! marshals a prompt and those settings into the engine and cleans the output.

// Public modules
pub mod backend;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod interactive;
pub mod options;
pub mod params;
pub mod predict;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for public API
pub use backend::{Backend, BootstrapRequest, PredictRequest};
pub use config::{EchoTrim, EngineConfig, ModelConfig, PredictConfig, TopKProfile, TurnMode};
pub use engine::{EngineBuilder, EngineInfo, LlamaEngine, Processor};
pub use error::{EngineError, ErrorExt, Result};
pub use interactive::InteractiveLoop;
pub use params::{ParamError, ParamKind, ParamValue, ParameterStore};
pub use predict::{predict, predict_with};
pub use session::{Session, SessionState};
pub use types::ProcessingOutput;

