//! Command-line interface for strictly_arena.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Arena - rock-paper-scissors against a friend or an LLM
#[derive(Parser, Debug)]
#[command(name = "strictly_arena")]
#[command(about = "Rock-paper-scissors arena with an LLM opponent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal
    Play {
        /// Path to arena config (defaults apply if the file is missing)
        #[arg(short, long, default_value = "arena_config.toml")]
        config: PathBuf,

        /// Never call the LLM; the opponent plays randomly
        #[arg(long)]
        offline: bool,

        /// Log file (logs stay off the terminal while playing)
        #[arg(long, default_value = "strictly_arena.log")]
        log_file: PathBuf,
    },

    /// Validate a config file and report which oracle would be used
    CheckConfig {
        /// Path to arena config
        #[arg(short, long, default_value = "arena_config.toml")]
        config: PathBuf,
    },
}
