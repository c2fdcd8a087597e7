//! Intents that drive the match state machine.
//!
//! Intents are inputs to [`Match::apply`](crate::Match::apply). Some come from
//! the presentation shell (a player clicked something); the rest are
//! completions of asynchronous work the machine asked for via effects. Both
//! kinds travel through the same serialized queue.

use crate::phase::Phase;
use crate::round::Ticket;
use crate::types::{Mode, Move, Slot};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Everything that can change a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    // =========================================================================
    // Shell intents
    // =========================================================================
    /// Names and mode chosen; leave pre-registration.
    RegisterPlayers {
        /// Name for slot 1.
        player1: String,
        /// Name for slot 2.
        player2: String,
        /// Who controls slot 2.
        mode: Mode,
    },

    /// Start a round from idle, or go back to idle from result.
    StartRound,

    /// A human picked a move.
    ChooseMove {
        /// Acting player.
        slot: Slot,
        /// Chosen move.
        choice: Move,
    },

    /// Abandon the match and return to registration.
    ResetMatch,

    // =========================================================================
    // Completions
    // =========================================================================
    /// The move oracle answered for the round with `ticket`.
    OracleMoveResolved {
        /// Round the request was made for.
        ticket: Ticket,
        /// Move played for slot 2.
        choice: Move,
    },

    /// The countdown timer fired for the round with `ticket`.
    CountdownTick {
        /// Round the countdown belongs to.
        ticket: Ticket,
    },

    /// Commentary arrived for the round with `ticket`.
    CommentaryResolved {
        /// Round the commentary describes.
        ticket: Ticket,
        /// One line of commentary.
        text: String,
    },
}

/// Why an intent was ignored.
///
/// Rejections are routine races between the shell and the match, not
/// failures; callers log them and move on.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum Rejection {
    /// The intent is not legal in the current phase.
    #[display("{intent} is not accepted while {phase}")]
    WrongPhase {
        /// Name of the rejected intent.
        intent: &'static str,
        /// Phase at the time.
        phase: Phase,
    },

    /// The acting player already chose this round.
    #[display("{_0} has already chosen")]
    SlotFilled(#[error(not(source))] Slot),

    /// The slot belongs to the oracle.
    #[display("{_0} is not controlled by a human")]
    NotHumanSlot(#[error(not(source))] Slot),

    /// A registration name was blank.
    #[display("player names must not be empty")]
    EmptyName,

    /// A completion arrived for a round that is no longer current.
    #[display("completion for round {got} arrived during round {current}")]
    StaleTicket {
        /// Ticket carried by the completion.
        got: Ticket,
        /// Ticket of the live round.
        current: Ticket,
    },

    /// An oracle move arrived although none was requested.
    #[display("no oracle move is pending")]
    NotPending,

    /// Finalization was attempted with a move missing.
    #[display("round cannot finalize before both moves are set")]
    RoundIncomplete,
}
