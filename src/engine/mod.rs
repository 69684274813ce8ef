//! Async facade over a [`Session`](crate::Session) and its parameter store

mod builder;
mod engine;

pub use builder::EngineBuilder;
pub use engine::{LlamaEngine, EngineInfo};

use crate::{
    error::Result,
    types::ProcessingOutput,
};

/// Trait defining the core processing capabilities
#[async_trait::async_trait]
pub trait Processor: Send + Sync {
    /// Process a single input
    async fn process(&self, input: String) -> Result<ProcessingOutput>;

    /// Shutdown the processor and release resources
    async fn shutdown(&self) -> Result<()>;
}

