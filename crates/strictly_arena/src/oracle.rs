//! Move and commentary oracle for the AI opponent.
//!
//! Every oracle call resolves. Failures of the underlying LLM are logged and
//! replaced by a local fallback so a round can always complete.

use crate::llm_client::{LlmClient, LlmError};
use async_trait::async_trait;
use rand::Rng;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use strictly_rps::{Move, MovePair, ORACLE_CONTEXT_ROUNDS};
use tracing::{debug, info, instrument, warn};

/// Commentary used whenever the oracle cannot provide one.
pub const FALLBACK_COMMENTARY: &str = "Stunning performance!";

/// Commentary used when the oracle answers with nothing.
pub const EMPTY_COMMENTARY: &str = "What a move!";

/// Schema name sent with structured move requests.
pub const MOVE_SCHEMA_NAME: &str = "move_reply";

const MOVE_SYSTEM_PROMPT: &str =
    "You are the AI opponent in a rock-paper-scissors arena. Answer only with your move.";

const COMMENTARY_SYSTEM_PROMPT: &str =
    "You are a sports commentator covering a rock-paper-scissors arena.";

/// Supplies the AI player's moves and post-round commentary.
#[async_trait]
pub trait MoveOracle: Send + Sync {
    /// Picks a move given recent rounds, most recent first.
    async fn request_move(&self, recent: &[MovePair]) -> Move;

    /// Produces one short sentence about a finished round.
    async fn request_commentary(&self, verdict: &str, player1: Move, player2: Move) -> String;

    /// Returns the oracle's display name.
    fn name(&self) -> &str;
}

/// Structured reply expected from the LLM for a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MoveReply {
    /// The chosen hand.
    pub choice: Move,
}

/// JSON schema restricting a reply to `{"choice": "rock" | "paper" | "scissors"}`.
pub fn move_reply_schema() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(MoveReply))
        .unwrap_or_else(|_| Value::Object(Default::default()));
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }
    schema
}

/// Parses a structured move reply.
pub fn parse_move_reply(reply: Value) -> Result<Move, LlmError> {
    serde_json::from_value::<MoveReply>(reply)
        .map(|r| r.choice)
        .map_err(|e| LlmError::new(format!("Move reply violates schema: {e}")))
}

/// Renders recent rounds as compact context, e.g. `U:rock,AI:paper,U:...`.
pub fn history_context(recent: &[MovePair]) -> String {
    if recent.is_empty() {
        return "None".to_string();
    }
    recent
        .iter()
        .take(ORACLE_CONTEXT_ROUNDS)
        .map(|pair| format!("U:{},AI:{}", pair.player1, pair.player2))
        .collect::<Vec<_>>()
        .join(",")
}

/// User prompt for a move request.
pub fn move_prompt(recent: &[MovePair]) -> String {
    format!(
        "Quickly pick rock, paper, or scissors to beat a human. History: {}",
        history_context(recent)
    )
}

/// User prompt for a commentary request.
pub fn commentary_prompt(verdict: &str, player1: Move, player2: Move) -> String {
    format!(
        "Match Result: {verdict}. P1: {player1}, P2: {player2}. \
         Give an ultra-short, witty 1-sentence sport commentary."
    )
}

/// Uniformly random move.
pub fn fallback_move() -> Move {
    let index = rand::thread_rng().gen_range(0..Move::ALL.len());
    Move::ALL[index]
}

/// Oracle backed by an LLM, falling back locally on any failure.
#[derive(Debug, Clone)]
pub struct LlmOracle {
    client: LlmClient,
    deadline: Duration,
    name: String,
}

impl LlmOracle {
    /// Creates an oracle whose calls give up after `deadline`.
    #[instrument(skip(client), fields(provider = %client.config().provider(), model = %client.config().model()))]
    pub fn new(client: LlmClient, deadline: Duration) -> Self {
        let name = format!("{} ({})", client.config().provider(), client.config().model());
        info!(%name, "Creating LLM oracle");
        Self {
            client,
            deadline,
            name,
        }
    }

    async fn try_move(&self, recent: &[MovePair]) -> Result<Move, LlmError> {
        let schema = move_reply_schema();
        let prompt = move_prompt(recent);
        let call = self.client.generate_structured(
            MOVE_SYSTEM_PROMPT,
            &prompt,
            MOVE_SCHEMA_NAME,
            &schema,
        );
        let reply = tokio::time::timeout(self.deadline, call)
            .await
            .map_err(|_| LlmError::new(format!("Move request timed out after {:?}", self.deadline)))??;
        parse_move_reply(reply)
    }

    async fn try_commentary(&self, verdict: &str, player1: Move, player2: Move) -> Result<String, LlmError> {
        let prompt = commentary_prompt(verdict, player1, player2);
        let call = self.client.generate(COMMENTARY_SYSTEM_PROMPT, &prompt);
        let text = tokio::time::timeout(self.deadline, call)
            .await
            .map_err(|_| {
                LlmError::new(format!("Commentary request timed out after {:?}", self.deadline))
            })??;
        let line = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string);
        if line.is_none() {
            debug!("Oracle returned empty commentary");
        }
        Ok(line.unwrap_or_else(|| EMPTY_COMMENTARY.to_string()))
    }
}

#[async_trait]
impl MoveOracle for LlmOracle {
    #[instrument(skip(self, recent), fields(oracle = %self.name, context = recent.len()))]
    async fn request_move(&self, recent: &[MovePair]) -> Move {
        match self.try_move(recent).await {
            Ok(choice) => {
                debug!(%choice, "Oracle chose move");
                choice
            }
            Err(e) => {
                let choice = fallback_move();
                warn!(error = %e, %choice, "Oracle move failed, using random fallback");
                choice
            }
        }
    }

    #[instrument(skip(self), fields(oracle = %self.name))]
    async fn request_commentary(&self, verdict: &str, player1: Move, player2: Move) -> String {
        match self.try_commentary(verdict, player1, player2).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Oracle commentary failed, using fallback");
                FALLBACK_COMMENTARY.to_string()
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Oracle that never leaves the process: random moves, fixed commentary.
#[derive(Debug, Clone, Default)]
pub struct OfflineOracle;

#[async_trait]
impl MoveOracle for OfflineOracle {
    async fn request_move(&self, _recent: &[MovePair]) -> Move {
        fallback_move()
    }

    async fn request_commentary(&self, _verdict: &str, _player1: Move, _player2: Move) -> String {
        FALLBACK_COMMENTARY.to_string()
    }

    fn name(&self) -> &str {
        "offline"
    }
}
