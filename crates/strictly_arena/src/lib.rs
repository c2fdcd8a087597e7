//! Strictly Arena - rock-paper-scissors with an LLM opponent
//!
//! This library runs a [`strictly_rps::Match`] inside an async session and
//! connects the AI player to an LLM.
//!
//! # Architecture
//!
//! - **Session**: serialized intent queue, effect interpreter, countdown timer
//! - **Oracle**: LLM-backed moves and commentary with a local fallback
//! - **LLM client**: Gemini, OpenAI and Anthropic over HTTP
//! - **Config**: TOML file plus API keys from the environment
//! - **Shell**: a thin line-oriented terminal front end
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_arena::{ArenaSession, CountdownSettings, OfflineOracle};
//! use strictly_rps::{Mode, Move, Phase, Slot};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (arena, _task) = ArenaSession::spawn(Arc::new(OfflineOracle), CountdownSettings::default());
//! arena.register_players("Striker", "Gemini AI", Mode::HumanVsAi)?;
//! arena.start_round()?;
//! arena.choose_move(Slot::Player1, Move::Rock)?;
//! let result = arena.wait_for(|s| *s.phase() == Phase::Result).await?;
//! println!("{}", result.commentary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod llm_client;
mod oracle;
mod session;
mod shell;

// Crate-level exports - Configuration
pub use config::{ArenaConfig, ConfigError};

// Crate-level exports - LLM client
pub use llm_client::{DEFAULT_REQUEST_TIMEOUT, LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Oracle
pub use oracle::{
    EMPTY_COMMENTARY, FALLBACK_COMMENTARY, LlmOracle, MOVE_SCHEMA_NAME, MoveOracle, MoveReply, OfflineOracle,
    commentary_prompt, fallback_move, history_context, move_prompt, move_reply_schema,
    parse_move_reply,
};

// Crate-level exports - Session
pub use session::{ArenaError, ArenaHandle, ArenaSession, CountdownSettings};

// Crate-level exports - Shell
pub use shell::{Command as ShellCommand, HELP, parse_command, render, run as run_shell};

use std::sync::Arc;
use tracing::{info, warn};

/// Builds the oracle described by `config`.
///
/// Falls back to [`OfflineOracle`] when `offline` is set or no API key is
/// available, so the arena is always playable.
pub fn build_oracle(config: &ArenaConfig, offline: bool) -> Arc<dyn MoveOracle> {
    if offline {
        info!("Offline mode requested");
        return Arc::new(OfflineOracle);
    }
    match config.create_llm_config() {
        Ok(llm) => Arc::new(LlmOracle::new(LlmClient::new(llm), config.request_timeout())),
        Err(e) => {
            warn!(error = %e, "No usable LLM configuration, playing offline");
            Arc::new(OfflineOracle)
        }
    }
}

/// Countdown pacing taken from `config`.
pub fn countdown_settings(config: &ArenaConfig) -> CountdownSettings {
    CountdownSettings::new(*config.countdown_from(), config.tick())
}
