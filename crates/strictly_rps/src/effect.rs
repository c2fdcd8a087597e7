//! Effects (side effects as data).
//!
//! The state machine never performs I/O. Transitions return effects, and an
//! interpreter outside this crate executes them and feeds the results back
//! as completion intents.

use crate::round::{MovePair, Ticket};
use crate::types::Move;
use serde::{Deserialize, Serialize};

/// Work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Ask the oracle for player 2's move.
    RequestOracleMove {
        /// Round the move is for.
        ticket: Ticket,
        /// At most three recent rounds, most recent first.
        recent: Vec<MovePair>,
    },

    /// Start ticking the countdown for `ticket`.
    StartCountdown {
        /// Round being resolved.
        ticket: Ticket,
        /// First displayed value.
        from: u8,
    },

    /// Stop any running countdown.
    CancelCountdown,

    /// Ask the oracle for a one-line commentary on a finalized round.
    RequestCommentary {
        /// Round being described.
        ticket: Ticket,
        /// Verdict text, e.g. "Striker Wins!".
        verdict: String,
        /// Move played in slot 1.
        player1: Move,
        /// Move played in slot 2.
        player2: Move,
    },
}
