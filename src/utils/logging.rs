use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info", "llama_bind=debug")
    pub directive: String,
    /// Whether to include source code locations
    pub source_location: bool,
    /// Whether to include thread ids
    pub thread_ids: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directive: Level::INFO.to_string().to_lowercase(),
            source_location: false,
            thread_ids: false,
        }
    }
}

impl LogConfig {
    pub fn with_directive(directive: impl Into<String>) -> Self {
        Self {
            directive: directive.into(),
            ..Default::default()
        }
    }
}

/// Initialize logging system.
///
/// Logs go to stderr so stdout carries only the conversation. Only the first
/// call installs a subscriber; later calls return `Ok(())`.
pub fn setup_logging(config: LogConfig) -> Result<(), String> {
    let mut result = Ok(());

    INIT.call_once(|| {
        result = setup_logging_internal(config);
    });

    result
}

fn setup_logging_internal(config: LogConfig) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.directive))
        .map_err(|e| format!("Invalid log filter '{}': {}", config.directive, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .try_init()
        .map_err(|e| format!("Failed to set global subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(LogConfig::default().directive, "info");
        assert_eq!(LogConfig::with_directive("debug").directive, "debug");
    }

    #[test]
    fn test_log_initialization() {
        assert!(setup_logging(LogConfig::default()).is_ok());
        // Second call is a no-op
        assert!(setup_logging(LogConfig::with_directive("trace")).is_ok());
        tracing::info!(component = "logging", "initialized");
    }
}
