use std::path::PathBuf;

use crate::params::ParamError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A flag or configuration value could not be used
    #[error("Configuration error for {parameter}: {message}")]
    Configuration {
        message: String,
        parameter: String,
    },

    /// A runtime `key=value` edit was rejected
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParamError),

    /// The engine refused to load the model
    #[error("Loading model {} failed (engine status {status})", .model_path.display())]
    Bootstrap {
        model_path: PathBuf,
        status: i32,
    },

    /// The engine reported a failure during generation
    #[error("Prediction failed (engine status {status})")]
    Prediction {
        status: i32,
    },

    /// The session or its engine state is not usable
    #[error("{resource_type:?} resource error: {message}")]
    Resource {
        message: String,
        resource_type: ResourceType,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking task could not be joined
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Resources whose misuse is reported as [`EngineError::Resource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Session,
    EngineState,
}

impl EngineError {
    pub(crate) fn config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Configuration {
            message: message.into(),
            parameter: parameter.into(),
        }
    }

    pub(crate) fn session(message: impl Into<String>) -> Self {
        EngineError::Resource {
            message: message.into(),
            resource_type: ResourceType::Session,
        }
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        EngineError::Runtime(err.to_string())
    }
}

/// Extension trait for error handling utilities
pub trait ErrorExt {
    /// Whether a caller can reasonably try again, possibly with other parameters
    fn is_recoverable(&self) -> bool;
}

impl ErrorExt for EngineError {
    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Parameter(_) | EngineError::Prediction { .. }
        )
    }
}
