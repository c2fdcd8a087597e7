//! Arena configuration.

use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for an arena session and its oracle.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// LLM provider backing the AI opponent.
    #[serde(default = "default_provider")]
    oracle_provider: LlmProvider,

    /// LLM model name; the provider default when absent.
    #[serde(default)]
    oracle_model: Option<String>,

    /// Maximum tokens for LLM responses.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Upper bound on any single oracle call, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    request_timeout_ms: u64,

    /// First value of the resolving countdown.
    #[serde(default = "default_countdown_from")]
    countdown_from: u8,

    /// Interval between countdown ticks, in milliseconds.
    #[serde(default = "default_tick_ms")]
    tick_ms: u64,

    /// Overrides the provider's API endpoint root.
    #[serde(default)]
    base_url: Option<String>,

    /// Name suggested for player 1 at registration.
    #[serde(default = "default_player1_name")]
    player1_name: String,

    /// Name suggested for player 2 at registration.
    #[serde(default = "default_player2_name")]
    player2_name: String,
}

fn default_provider() -> LlmProvider {
    LlmProvider::Gemini
}

fn default_max_tokens() -> u32 {
    150
}

fn default_request_timeout_ms() -> u64 {
    8_000
}

fn default_countdown_from() -> u8 {
    strictly_rps::DEFAULT_COUNTDOWN_FROM
}

fn default_tick_ms() -> u64 {
    450
}

fn default_player1_name() -> String {
    "Striker".to_string()
}

fn default_player2_name() -> String {
    "Gemini AI".to_string()
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            oracle_provider: default_provider(),
            oracle_model: None,
            max_tokens: default_max_tokens(),
            request_timeout_ms: default_request_timeout_ms(),
            countdown_from: default_countdown_from(),
            tick_ms: default_tick_ms(),
            base_url: None,
            player1_name: default_player1_name(),
            player2_name: default_player2_name(),
        }
    }
}

impl ArenaConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        info!(provider = %config.oracle_provider, model = %config.model(), "Config loaded");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Checks values that would stall a session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::new("tick_ms must be positive".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::new("request_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Model to request, falling back to the provider default.
    pub fn model(&self) -> &str {
        self.oracle_model
            .as_deref()
            .unwrap_or_else(|| self.oracle_provider.default_model())
    }

    /// Countdown tick interval.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Upper bound on a single oracle call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Reads the provider's API key from the environment.
    pub fn api_key(&self) -> Option<String> {
        self.oracle_provider
            .api_key_vars()
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Creates LLM configuration from this arena config.
    ///
    /// Requires the provider's API key in the environment (`GEMINI_API_KEY`,
    /// `OPENAI_API_KEY` or `ANTHROPIC_API_KEY`).
    #[instrument(skip(self), fields(provider = %self.oracle_provider, model = %self.model()))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let api_key = self.api_key().ok_or_else(|| {
            ConfigError::new(format!(
                "{} environment variable not set",
                self.oracle_provider.api_key_vars().join(" or ")
            ))
        })?;
        self.llm_config_with_key(api_key)
    }

    /// Creates LLM configuration using an explicit API key.
    pub fn llm_config_with_key(&self, api_key: String) -> Result<LlmConfig, ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::new("request_timeout_ms must be positive".to_string()));
        }
        let mut config = LlmConfig::new(
            self.oracle_provider,
            api_key,
            self.model().to_string(),
            self.max_tokens,
        )
        .with_timeout(self.request_timeout());
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        Ok(config)
    }

    /// Returns a copy pointing the oracle at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Returns a copy with different countdown pacing.
    pub fn with_countdown(mut self, from: u8, tick_ms: u64) -> Self {
        self.countdown_from = from;
        self.tick_ms = tick_ms;
        self
    }

    /// Returns a copy with a different oracle deadline.
    pub fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
