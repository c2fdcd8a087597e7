//! Core domain types for rock-paper-scissors.

use derive_getters::Getters;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A hand thrown in a round.
///
/// "Not chosen yet" is modelled as `Option<Move>::None` by the match, so a
/// `Move` value is always resolved.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Move {
    /// Crushes scissors.
    Rock,
    /// Covers rock.
    Paper,
    /// Cuts paper.
    Scissors,
}

impl Move {
    /// Every move, in a fixed order.
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];
}

/// Addresses one of the two players of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    /// The first (always human) player.
    #[strum(to_string = "player1")]
    Player1,
    /// The second player, human or AI depending on the mode.
    #[strum(to_string = "player2")]
    Player2,
}

impl Slot {
    /// Returns the other slot.
    pub fn other(self) -> Self {
        match self {
            Slot::Player1 => Slot::Player2,
            Slot::Player2 => Slot::Player1,
        }
    }
}

/// Result of comparing two resolved moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Player 1 took the round.
    #[strum(to_string = "player1")]
    Player1,
    /// Player 2 took the round.
    #[strum(to_string = "player2")]
    Player2,
    /// Both threw the same hand.
    #[strum(to_string = "draw")]
    Draw,
}

impl Outcome {
    /// Returns the winning slot, if any.
    pub fn winner(&self) -> Option<Slot> {
        match self {
            Outcome::Player1 => Some(Slot::Player1),
            Outcome::Player2 => Some(Slot::Player2),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the round was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

/// Who controls a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerRole {
    /// A person at the keyboard.
    Human,
    /// The move oracle.
    Ai,
}

/// Match mode, chosen at registration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum Mode {
    /// Two people share the shell.
    #[strum(to_string = "human-vs-human", serialize = "human", serialize = "pvp")]
    HumanVsHuman,
    /// Player 2 is driven by the move oracle.
    #[strum(to_string = "human-vs-ai", serialize = "ai", serialize = "pva")]
    HumanVsAi,
}

impl Mode {
    /// Role of the second player under this mode.
    pub fn player2_role(self) -> PlayerRole {
        match self {
            Mode::HumanVsHuman => PlayerRole::Human,
            Mode::HumanVsAi => PlayerRole::Ai,
        }
    }
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Player {
    /// Display name.
    name: String,
    /// Human or AI.
    role: PlayerRole,
}

impl Player {
    /// Creates a new player.
    pub fn new(name: impl Into<String>, role: PlayerRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}
