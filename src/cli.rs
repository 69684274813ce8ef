//! Command-line flags for the standalone program

use std::path::PathBuf;

use clap::Parser;

use crate::config::{EngineConfig, TurnMode};

#[derive(Parser, Debug)]
#[command(name = "llama-bind", version, about = "Interactive prompt loop for a quantized llama model")]
pub struct Args {
    /// Path to q4_0.bin model file to load
    #[arg(short = 'm', long = "model")]
    pub model: Option<PathBuf>,

    /// Number of threads to use during computation
    #[arg(short = 't', long = "threads")]
    pub threads: Option<i32>,

    /// Number of tokens to predict
    #[arg(short = 'n', long = "tokens")]
    pub tokens: Option<i32>,

    /// Context size
    #[arg(short = 'c', long = "ctx-size")]
    pub ctx_size: Option<i32>,

    /// JSON config file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Treat every line as a prompt instead of waiting for a blank line
    #[arg(long)]
    pub single_line: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Overlay the flags that were given on `config`
pub fn apply_flags(config: &mut EngineConfig, args: Args) {
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if let Some(threads) = args.threads {
        config.predict.threads = threads;
    }
    if let Some(tokens) = args.tokens {
        config.predict.tokens = tokens;
    }
    if let Some(ctx_size) = args.ctx_size {
        config.model.context_size = ctx_size;
    }
    if args.single_line {
        config.turn_mode = TurnMode::SingleLine;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MODEL_PATH, UNBOUNDED_TOKENS};
    use pretty_assertions::assert_eq;

    fn configure(argv: &[&str]) -> EngineConfig {
        let args = Args::try_parse_from(argv).unwrap();
        let mut config = EngineConfig::default();
        apply_flags(&mut config, args);
        config
    }

    #[test]
    fn test_flag_defaults() {
        let config = configure(&["llama-bind"]);
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.predict.tokens, 128);
        assert_eq!(config.model.context_size, 512);
        assert_eq!(config.turn_mode, TurnMode::MultiLine);
    }

    #[test]
    fn test_flags_override() {
        let config = configure(&["llama-bind", "-m", "/m.bin", "-t", "3", "-n", "16", "--single-line"]);
        assert_eq!(config.model_path, PathBuf::from("/m.bin"));
        assert_eq!(config.predict.threads, 3);
        assert_eq!(config.predict.tokens, 16);
        assert_eq!(config.turn_mode, TurnMode::SingleLine);
    }

    #[test]
    fn test_long_flags() {
        let config = configure(&["llama-bind", "--ctx-size", "2048", "--log-level", "debug", "--tokens", "0"]);
        assert_eq!(config.model.context_size, 2048);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.predict.tokens, 0);
        assert_eq!(config.predict.normalized().tokens, UNBOUNDED_TOKENS);
    }

    #[test]
    fn test_flags_keep_file_values() {
        let mut config = EngineConfig::default();
        config.predict.seed = 9;
        config.model.context_size = 1024;
        apply_flags(&mut config, Args::try_parse_from(["llama-bind", "-t", "2"]).unwrap());
        assert_eq!(config.predict.seed, 9);
        assert_eq!(config.model.context_size, 1024);
        assert_eq!(config.predict.threads, 2);
    }

    #[test]
    fn test_bad_flag_value() {
        assert!(Args::try_parse_from(["llama-bind", "-t", "many"]).is_err());
        assert!(Args::try_parse_from(["llama-bind", "--unknown"]).is_err());
    }
}
