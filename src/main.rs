use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;

use llama_bind::{
    backend::NativeBackend,
    cli::{apply_flags, Args},
    config::EngineConfig,
    utils::{setup_logging, LogConfig},
    InteractiveLoop, ParameterStore, Session,
};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Reading config {} failed", path.display()))?,
        None => EngineConfig::default(),
    };
    apply_flags(&mut config, args);

    setup_logging(LogConfig::with_directive(config.log_level.clone())).map_err(anyhow::Error::msg)?;

    println!("Loading model {}...", config.model_path.display());
    let session = Session::load(NativeBackend, &config.model_path, &config.model)
        .context("Loading the model failed")?;
    println!("Model loaded successfully.");

    let store = ParameterStore::from_config(&config.predict);
    let repl = InteractiveLoop::new(&session, &store, config.predict, config.turn_mode);
    repl.run(io::stdin().lock(), io::stdout().lock())
        .context("Interactive session failed")?;

    session.release()?;
    Ok(())
}
