//! Pure rock-paper-scissors match logic.
//!
//! # Architecture
//!
//! - **Rules**: [`evaluate`] maps two moves to an [`Outcome`]
//! - **Machine**: [`Match`] owns the match and applies one [`Intent`] at a time
//! - **Effects**: transitions return [`Effect`]s instead of doing I/O
//! - **Snapshot**: [`Snapshot`] is the read-only view handed to a shell
//!
//! Nothing here is async. A runtime executes the effects and feeds their
//! results back as completion intents.
//!
//! # Example
//!
//! ```
//! use strictly_rps::{Intent, Match, Mode, Move, Phase, Slot};
//!
//! let mut game = Match::new();
//! game.apply(Intent::RegisterPlayers {
//!     player1: "Ada".into(),
//!     player2: "Grace".into(),
//!     mode: Mode::HumanVsHuman,
//! })
//! .unwrap();
//! game.apply(Intent::StartRound).unwrap();
//! game.apply(Intent::ChooseMove { slot: Slot::Player1, choice: Move::Rock }).unwrap();
//! game.apply(Intent::ChooseMove { slot: Slot::Player2, choice: Move::Paper }).unwrap();
//! assert_eq!(game.phase(), Phase::Resolving);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod effect;
mod intent;
mod machine;
mod phase;
mod round;
mod rules;
mod snapshot;
mod types;

pub use effect::Effect;
pub use intent::{Intent, Rejection};
pub use machine::{AWAITING_REGISTRATION, DEFAULT_COUNTDOWN_FROM, MAKE_YOUR_CHOICE, Match};
pub use phase::{Countdown, Phase};
pub use round::{
    HISTORY_LIMIT, History, MovePair, ORACLE_CONTEXT_ROUNDS, RoundRecord, Scoreboard, Ticket,
};
pub use rules::evaluate;
pub use snapshot::Snapshot;
pub use types::{Mode, Move, Outcome, Player, PlayerRole, Slot};
