//! Outcome evaluation.

use crate::types::{Move, Outcome};
use tracing::instrument;

impl Move {
    /// Returns true if this move defeats `other`.
    ///
    /// Dominance is cyclic: rock > scissors > paper > rock.
    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors) | (Move::Paper, Move::Rock) | (Move::Scissors, Move::Paper)
        )
    }
}

/// Compares two resolved moves.
///
/// Draw if the moves are equal, player 1 if `player1` beats `player2`,
/// player 2 otherwise.
#[instrument(level = "trace")]
pub fn evaluate(player1: Move, player2: Move) -> Outcome {
    if player1 == player2 {
        Outcome::Draw
    } else if player1.beats(player2) {
        Outcome::Player1
    } else {
        Outcome::Player2
    }
}
