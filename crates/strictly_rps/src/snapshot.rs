//! Read-only view of a match for the presentation shell.

use crate::phase::{Countdown, Phase};
use crate::round::{RoundRecord, Scoreboard};
use crate::types::{Mode, Move, Player, Slot};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Everything a shell needs to render the match.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Snapshot {
    /// Active phase.
    pub(crate) phase: Phase,
    /// Registered mode.
    pub(crate) mode: Option<Mode>,
    /// First player, once registered.
    pub(crate) player1: Option<Player>,
    /// Second player, once registered.
    pub(crate) player2: Option<Player>,
    /// Player 1's move this round.
    pub(crate) player1_move: Option<Move>,
    /// Player 2's move this round.
    pub(crate) player2_move: Option<Move>,
    /// True while the oracle is choosing player 2's move.
    pub(crate) oracle_pending: bool,
    /// Whose move the shell should prompt for.
    pub(crate) awaiting: Option<Slot>,
    /// Cumulative scores.
    pub(crate) scores: Scoreboard,
    /// Up to five finalized rounds, most recent first.
    pub(crate) history: Vec<RoundRecord>,
    /// Latest commentary line.
    pub(crate) commentary: String,
    /// Countdown display while resolving.
    pub(crate) countdown: Option<Countdown>,
}

impl Snapshot {
    /// Display name of the player in `slot`, if registered.
    pub fn name(&self, slot: Slot) -> Option<&str> {
        let player = match slot {
            Slot::Player1 => self.player1.as_ref(),
            Slot::Player2 => self.player2.as_ref(),
        };
        player.map(|p| p.name().as_str())
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        crate::Match::new().snapshot()
    }
}
