//! The round/match state machine.
//!
//! A [`Match`] is the only owner of match state. [`Match::apply`] takes one
//! intent at a time, mutates the match, and returns the effects the caller
//! must run. Rejected intents leave the match untouched.

use crate::effect::Effect;
use crate::intent::{Intent, Rejection};
use crate::phase::{Countdown, Phase};
use crate::round::{History, ORACLE_CONTEXT_ROUNDS, RoundRecord, Scoreboard, Ticket};
use crate::rules::evaluate;
use crate::snapshot::Snapshot;
use crate::types::{Mode, Move, Outcome, Player, PlayerRole, Slot};
use tracing::{debug, info, instrument};

/// Default first value of the resolving countdown.
pub const DEFAULT_COUNTDOWN_FROM: u8 = 3;

/// Commentary shown before registration.
pub const AWAITING_REGISTRATION: &str = "Register two players to enter the arena.";

/// Commentary shown when a round opens.
pub const MAKE_YOUR_CHOICE: &str = "Make your choice...";

/// The two players and the mode they registered with.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Roster {
    mode: Mode,
    player1: Player,
    player2: Player,
}

impl Roster {
    fn name(&self, slot: Slot) -> &str {
        match slot {
            Slot::Player1 => self.player1.name(),
            Slot::Player2 => self.player2.name(),
        }
    }

    fn verdict(&self, outcome: Outcome) -> String {
        match outcome.winner() {
            Some(slot) => format!("{} Wins!", self.name(slot)),
            None => "It's a draw!".to_string(),
        }
    }
}

/// Move slots of the round in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CurrentRound {
    player1: Option<Move>,
    player2: Option<Move>,
}

impl CurrentRound {
    fn get(&self, slot: Slot) -> Option<Move> {
        match slot {
            Slot::Player1 => self.player1,
            Slot::Player2 => self.player2,
        }
    }

    fn set(&mut self, slot: Slot, choice: Move) {
        match slot {
            Slot::Player1 => self.player1 = Some(choice),
            Slot::Player2 => self.player2 = Some(choice),
        }
    }

    fn both(&self) -> Option<(Move, Move)> {
        self.player1.zip(self.player2)
    }
}

/// A rock-paper-scissors match.
#[derive(Debug, Clone)]
pub struct Match {
    phase: Phase,
    roster: Option<Roster>,
    scores: Scoreboard,
    history: History,
    current: CurrentRound,
    oracle_pending: bool,
    awaiting: Option<Slot>,
    commentary: String,
    countdown: Option<Countdown>,
    countdown_from: u8,
    ticket: Ticket,
    last_finalized: Option<Ticket>,
}

impl Match {
    /// Creates a match in pre-registration with the default countdown.
    pub fn new() -> Self {
        Self::with_countdown(DEFAULT_COUNTDOWN_FROM)
    }

    /// Creates a match whose resolving countdown starts at `from`.
    #[instrument]
    pub fn with_countdown(from: u8) -> Self {
        Self {
            phase: Phase::PreRegistration,
            roster: None,
            scores: Scoreboard::default(),
            history: History::new(),
            current: CurrentRound::default(),
            oracle_pending: false,
            awaiting: None,
            commentary: AWAITING_REGISTRATION.to_string(),
            countdown: None,
            countdown_from: from,
            ticket: Ticket::default(),
            last_finalized: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Ticket of the current (or most recently opened) round.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Cumulative scores.
    pub fn scores(&self) -> Scoreboard {
        self.scores
    }

    /// Finalized rounds, most recent first.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Read-only view for the presentation shell.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            mode: self.roster.as_ref().map(|r| r.mode),
            player1: self.roster.as_ref().map(|r| r.player1.clone()),
            player2: self.roster.as_ref().map(|r| r.player2.clone()),
            player1_move: self.current.player1,
            player2_move: self.current.player2,
            oracle_pending: self.oracle_pending,
            awaiting: self.awaiting,
            scores: self.scores,
            history: self.history.to_vec(),
            commentary: self.commentary.clone(),
            countdown: self.countdown,
        }
    }

    /// Applies one intent.
    ///
    /// Returns the effects to execute, or the reason the intent was ignored.
    #[instrument(skip(self), fields(phase = %self.phase, ticket = %self.ticket))]
    pub fn apply(&mut self, intent: Intent) -> Result<Vec<Effect>, Rejection> {
        match intent {
            Intent::RegisterPlayers {
                player1,
                player2,
                mode,
            } => self.register(&player1, &player2, mode),
            Intent::StartRound => self.start_round(),
            Intent::ChooseMove { slot, choice } => self.choose_move(slot, choice),
            Intent::ResetMatch => Ok(self.reset()),
            Intent::OracleMoveResolved { ticket, choice } => self.oracle_resolved(ticket, choice),
            Intent::CountdownTick { ticket } => self.tick(ticket),
            Intent::CommentaryResolved { ticket, text } => self.commentary_resolved(ticket, text),
        }
    }

    fn require_phase(&self, intent: &'static str, expected: Phase) -> Result<(), Rejection> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Rejection::WrongPhase {
                intent,
                phase: self.phase,
            })
        }
    }

    fn require_current(&self, ticket: Ticket) -> Result<(), Rejection> {
        if ticket == self.ticket {
            Ok(())
        } else {
            Err(Rejection::StaleTicket {
                got: ticket,
                current: self.ticket,
            })
        }
    }

    fn register(&mut self, player1: &str, player2: &str, mode: Mode) -> Result<Vec<Effect>, Rejection> {
        self.require_phase("register", Phase::PreRegistration)?;
        let (player1, player2) = (player1.trim(), player2.trim());
        if player1.is_empty() || player2.is_empty() {
            return Err(Rejection::EmptyName);
        }

        info!(%player1, %player2, %mode, "Players registered");
        self.commentary = format!("Welcome to the Arena, {player1} and {player2}!");
        self.roster = Some(Roster {
            mode,
            player1: Player::new(player1, PlayerRole::Human),
            player2: Player::new(player2, mode.player2_role()),
        });
        self.scores = Scoreboard::default();
        self.history = History::new();
        self.phase = Phase::Idle;
        Ok(Vec::new())
    }

    fn start_round(&mut self) -> Result<Vec<Effect>, Rejection> {
        match self.phase {
            Phase::Idle => {
                self.ticket = self.ticket.next();
                self.current = CurrentRound::default();
                self.oracle_pending = false;
                self.awaiting = Some(Slot::Player1);
                self.commentary = MAKE_YOUR_CHOICE.to_string();
                self.phase = Phase::Selecting;
                info!(ticket = %self.ticket, "Round started");
                Ok(Vec::new())
            }
            Phase::Result => {
                self.current = CurrentRound::default();
                self.awaiting = None;
                self.phase = Phase::Idle;
                debug!("Back to idle");
                Ok(Vec::new())
            }
            phase => Err(Rejection::WrongPhase {
                intent: "start round",
                phase,
            }),
        }
    }

    fn choose_move(&mut self, slot: Slot, choice: Move) -> Result<Vec<Effect>, Rejection> {
        self.require_phase("choose move", Phase::Selecting)?;
        let Some(roster) = &self.roster else {
            return Err(Rejection::WrongPhase {
                intent: "choose move",
                phase: self.phase,
            });
        };
        let mode = roster.mode;
        if mode == Mode::HumanVsAi && slot == Slot::Player2 {
            return Err(Rejection::NotHumanSlot(slot));
        }
        if self.current.get(slot).is_some() {
            return Err(Rejection::SlotFilled(slot));
        }

        self.current.set(slot, choice);
        debug!(%slot, %choice, "Move recorded");

        match mode {
            Mode::HumanVsAi => {
                self.oracle_pending = true;
                self.awaiting = Some(Slot::Player2);
                Ok(vec![Effect::RequestOracleMove {
                    ticket: self.ticket,
                    recent: self.history.recent(ORACLE_CONTEXT_ROUNDS),
                }])
            }
            Mode::HumanVsHuman => {
                if self.current.both().is_some() {
                    return Ok(self.begin_resolving());
                }
                let other = slot.other();
                self.commentary = format!(
                    "{} has chosen. Waiting for {}...",
                    roster.name(slot),
                    roster.name(other)
                );
                self.awaiting = Some(other);
                Ok(Vec::new())
            }
        }
    }

    fn oracle_resolved(&mut self, ticket: Ticket, choice: Move) -> Result<Vec<Effect>, Rejection> {
        self.require_current(ticket)?;
        self.require_phase("oracle move", Phase::Selecting)?;
        if !self.oracle_pending {
            return Err(Rejection::NotPending);
        }

        self.current.set(Slot::Player2, choice);
        self.oracle_pending = false;
        debug!(%choice, "Oracle move recorded");
        Ok(self.begin_resolving())
    }

    fn begin_resolving(&mut self) -> Vec<Effect> {
        self.phase = Phase::Resolving;
        self.awaiting = None;
        self.countdown = Some(Countdown::start(self.countdown_from));
        vec![Effect::StartCountdown {
            ticket: self.ticket,
            from: self.countdown_from,
        }]
    }

    fn tick(&mut self, ticket: Ticket) -> Result<Vec<Effect>, Rejection> {
        self.require_current(ticket)?;
        self.require_phase("countdown tick", Phase::Resolving)?;

        match self.countdown.and_then(Countdown::next) {
            Some(next) => {
                self.countdown = Some(next);
                Ok(Vec::new())
            }
            None => self.finalize(),
        }
    }

    fn finalize(&mut self) -> Result<Vec<Effect>, Rejection> {
        let (player1, player2) = self.current.both().ok_or(Rejection::RoundIncomplete)?;
        let roster = self.roster.as_ref().ok_or(Rejection::RoundIncomplete)?;

        let outcome = evaluate(player1, player2);
        let verdict = roster.verdict(outcome);
        self.scores.award(outcome);
        self.history.push(RoundRecord::new(
            self.ticket,
            player1,
            player2,
            outcome,
            verdict.clone(),
        ));
        self.commentary = verdict.clone();
        self.countdown = None;
        self.last_finalized = Some(self.ticket);
        self.phase = Phase::Result;

        info!(%player1, %player2, %outcome, %verdict, "Round finalized");
        Ok(vec![
            Effect::CancelCountdown,
            Effect::RequestCommentary {
                ticket: self.ticket,
                verdict,
                player1,
                player2,
            },
        ])
    }

    fn commentary_resolved(&mut self, ticket: Ticket, text: String) -> Result<Vec<Effect>, Rejection> {
        if self.last_finalized != Some(ticket) {
            return Err(Rejection::StaleTicket {
                got: ticket,
                current: self.ticket,
            });
        }

        self.history.attach_commentary(ticket, &text);
        if ticket == self.ticket {
            self.commentary = text;
        }
        Ok(Vec::new())
    }

    fn reset(&mut self) -> Vec<Effect> {
        let effects = if self.phase == Phase::Resolving {
            vec![Effect::CancelCountdown]
        } else {
            Vec::new()
        };

        info!(from = %self.phase, "Match reset");
        *self = Self {
            ticket: self.ticket.next(),
            ..Self::with_countdown(self.countdown_from)
        };
        effects
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}
