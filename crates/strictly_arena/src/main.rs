//! Strictly Arena - Unified CLI

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::{Path, PathBuf};
use strictly_arena::{
    ArenaConfig, ArenaSession, MoveOracle, build_oracle, countdown_settings, run_shell,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            offline,
            log_file,
        } => run_play(config, offline, log_file).await,
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Play in the terminal
#[instrument(skip_all)]
async fn run_play(config_path: PathBuf, offline: bool, log_file: PathBuf) -> Result<()> {
    // Log to a file so output does not interleave with the prompt
    let log = std::fs::File::create(&log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log))
        .with_ansi(false)
        .init();

    info!("Starting Strictly Arena");

    let config = ArenaConfig::load_or_default(&config_path)?;
    let oracle = build_oracle(&config, offline);
    println!("Opponent: {}", oracle.name());

    let (handle, session) = ArenaSession::spawn(oracle, countdown_settings(&config));
    run_shell(handle, &config).await?;

    session.abort();
    Ok(())
}

/// Validate a config file
fn check_config(path: &Path) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = ArenaConfig::load_or_default(path)?;
    println!("provider:  {}", config.oracle_provider());
    println!("model:     {}", config.model());
    println!("countdown: {} x {:?}", config.countdown_from(), config.tick());
    match config.create_llm_config() {
        Ok(_) => println!("oracle:    online"),
        Err(e) => println!("oracle:    offline ({})", e.message),
    }
    Ok(())
}
