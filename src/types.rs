//! Common type definitions used throughout the engine

use std::time::Duration;
use serde::{Serialize, Deserialize};

/// Processing output from the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutput {
    /// Generated text, prompt echo removed
    pub text: String,
    /// Time taken to process
    pub processing_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_serializes() {
        let output = ProcessingOutput {
            text: "hi".to_string(),
            processing_time: Duration::from_millis(5),
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"text\":\"hi\""));
    }
}
