//! Finalized rounds, the bounded match history, and the scoreboard.

use crate::types::{Move, Outcome, Slot};
use derive_getters::Getters;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// Maximum number of finalized rounds kept in the history.
pub const HISTORY_LIMIT: usize = 5;

/// Number of recent rounds handed to the move oracle as context.
pub const ORACLE_CONTEXT_ROUNDS: usize = 3;

/// Identifies a round.
///
/// Every asynchronous request and timer tick carries the ticket of the round
/// that issued it, so late completions can be told apart from current ones.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[display("#{}", _0)]
pub struct Ticket(pub u64);

impl Ticket {
    /// Returns the following ticket.
    pub fn next(self) -> Self {
        Ticket(self.0 + 1)
    }
}

/// Both moves of a past round, as shown to the move oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePair {
    /// The human's move.
    pub player1: Move,
    /// The opponent's move.
    pub player2: Move,
}

/// A finalized round.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Ticket of the round.
    ticket: Ticket,
    /// Player 1's move.
    player1: Move,
    /// Player 2's move.
    player2: Move,
    /// Computed outcome.
    outcome: Outcome,
    /// Human-readable result, e.g. `"Striker Wins!"`.
    verdict: String,
    /// Commentary, attached once the oracle answers.
    commentary: Option<String>,
}

impl RoundRecord {
    /// Creates a record without commentary.
    pub fn new(ticket: Ticket, player1: Move, player2: Move, outcome: Outcome, verdict: String) -> Self {
        Self {
            ticket,
            player1,
            player2,
            outcome,
            verdict,
            commentary: None,
        }
    }

    /// The moves of this round as a pair.
    pub fn moves(&self) -> MovePair {
        MovePair {
            player1: self.player1,
            player2: self.player2,
        }
    }
}

/// Most-recent-first history of finalized rounds, bounded to [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    rounds: VecDeque<RoundRecord>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record at the front, evicting the oldest beyond the limit.
    #[instrument(skip(self, record), fields(ticket = %record.ticket, len = self.rounds.len()))]
    pub fn push(&mut self, record: RoundRecord) {
        self.rounds.push_front(record);
        while self.rounds.len() > HISTORY_LIMIT {
            if let Some(evicted) = self.rounds.pop_back() {
                debug!(evicted = %evicted.ticket, "Evicted oldest round from history");
            }
        }
    }

    /// Move pairs of the `n` most recent rounds, most recent first.
    pub fn recent(&self, n: usize) -> Vec<MovePair> {
        self.rounds.iter().take(n).map(RoundRecord::moves).collect()
    }

    /// Attaches commentary to the record with the given ticket.
    ///
    /// Returns false if that round has already been evicted.
    pub fn attach_commentary(&mut self, ticket: Ticket, text: &str) -> bool {
        match self.rounds.iter_mut().find(|r| r.ticket == ticket) {
            Some(record) => {
                record.commentary = Some(text.to_string());
                true
            }
            None => false,
        }
    }

    /// Iterates most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &RoundRecord> {
        self.rounds.iter()
    }

    /// The most recent record.
    pub fn latest(&self) -> Option<&RoundRecord> {
        self.rounds.front()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// True if no round has been finalized yet.
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Copies the records out, most recent first.
    pub fn to_vec(&self) -> Vec<RoundRecord> {
        self.rounds.iter().cloned().collect()
    }
}

/// Cumulative wins per player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Rounds won by player 1.
    player1: u32,
    /// Rounds won by player 2.
    player2: u32,
}

impl Scoreboard {
    /// Score of the given slot.
    pub fn get(&self, slot: Slot) -> u32 {
        match slot {
            Slot::Player1 => self.player1,
            Slot::Player2 => self.player2,
        }
    }

    /// Credits the winner of `outcome`; draws change nothing.
    pub fn award(&mut self, outcome: Outcome) {
        match outcome.winner() {
            Some(Slot::Player1) => self.player1 += 1,
            Some(Slot::Player2) => self.player2 += 1,
            None => {}
        }
    }
}
