//! Match phases and the resolving countdown.

use serde::{Deserialize, Serialize};
use strum::Display;

/// The match's overall stage. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    /// Players not yet registered.
    #[default]
    PreRegistration,
    /// Ready to start a round.
    Idle,
    /// Waiting for one or both moves.
    Selecting,
    /// Both moves known; countdown running.
    Resolving,
    /// Outcome on display.
    Result,
}

/// Display value of the countdown shown while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Countdown {
    /// Seconds-style count, shown as a number.
    Count(u8),
    /// Last step before the reveal.
    Shoot,
}

impl Countdown {
    /// First display value for a countdown from `from`.
    pub fn start(from: u8) -> Self {
        if from == 0 {
            Countdown::Shoot
        } else {
            Countdown::Count(from)
        }
    }

    /// Next display value, or `None` once the terminal tick is reached.
    pub fn next(self) -> Option<Self> {
        match self {
            Countdown::Count(n) if n > 1 => Some(Countdown::Count(n - 1)),
            Countdown::Count(_) => Some(Countdown::Shoot),
            Countdown::Shoot => None,
        }
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Countdown::Count(n) => write!(f, "{n}"),
            Countdown::Shoot => write!(f, "SHOOT!"),
        }
    }
}
