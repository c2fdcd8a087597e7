//! Arena session: the serialized intent queue around a [`Match`].
//!
//! One task owns the match and drains an intent queue. Shell intents and the
//! completions of oracle calls and countdown ticks all arrive through that
//! queue, so the match is never touched by two writers at once. Snapshots are
//! published on a watch channel after every accepted intent.

use crate::oracle::MoveOracle;
use derive_more::{Display, Error};
use derive_new::new;
use std::sync::Arc;
use std::time::Duration;
use strictly_rps::{Effect, Intent, Match, Mode, Move, MovePair, Slot, Snapshot, Ticket};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Shortest countdown interval; `tokio::time::interval` rejects zero.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Pacing of the resolving countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct CountdownSettings {
    /// First displayed value.
    pub from: u8,
    /// Interval between ticks.
    pub tick: Duration,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            from: strictly_rps::DEFAULT_COUNTDOWN_FROM,
            tick: Duration::from_millis(450),
        }
    }
}

/// Owns a match and executes its effects.
pub struct ArenaSession {
    game: Match,
    oracle: Arc<dyn MoveOracle>,
    tick: Duration,
    intents: mpsc::UnboundedReceiver<Intent>,
    completions: mpsc::WeakUnboundedSender<Intent>,
    snapshots: watch::Sender<Snapshot>,
    countdown: Option<JoinHandle<()>>,
}

impl ArenaSession {
    /// Spawns a session task and returns a handle to it.
    ///
    /// The session stops once every [`ArenaHandle`] has been dropped and all
    /// in-flight oracle calls have finished.
    #[instrument(skip(oracle), fields(oracle = %oracle.name()))]
    pub fn spawn(oracle: Arc<dyn MoveOracle>, countdown: CountdownSettings) -> (ArenaHandle, JoinHandle<()>) {
        let game = Match::with_countdown(countdown.from);
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(game.snapshot());

        let session = Self {
            game,
            oracle,
            tick: countdown.tick,
            intents: intent_rx,
            completions: intent_tx.downgrade(),
            snapshots: snapshot_tx,
            countdown: None,
        };
        let task = tokio::spawn(session.run());
        info!("Arena session started");

        (
            ArenaHandle {
                intents: intent_tx,
                snapshots: snapshot_rx,
            },
            task,
        )
    }

    async fn run(mut self) {
        while let Some(intent) = self.intents.recv().await {
            self.handle(intent);
        }
        self.cancel_countdown();
        info!("Arena session stopped");
    }

    fn handle(&mut self, intent: Intent) {
        match self.game.apply(intent) {
            Ok(effects) => {
                for effect in effects {
                    self.execute(effect);
                }
                self.snapshots.send_replace(self.game.snapshot());
            }
            Err(rejection) => debug!(%rejection, "Intent ignored"),
        }
    }

    fn execute(&mut self, effect: Effect) {
        debug!(?effect, "Executing effect");
        match effect {
            Effect::RequestOracleMove { ticket, recent } => self.request_move(ticket, recent),
            Effect::StartCountdown { ticket, .. } => self.start_countdown(ticket),
            Effect::CancelCountdown => self.cancel_countdown(),
            Effect::RequestCommentary {
                ticket,
                verdict,
                player1,
                player2,
            } => self.request_commentary(ticket, verdict, player1, player2),
        }
    }

    fn request_move(&self, ticket: Ticket, recent: Vec<MovePair>) {
        let oracle = Arc::clone(&self.oracle);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let choice = oracle.request_move(&recent).await;
            complete(&completions, Intent::OracleMoveResolved { ticket, choice });
        });
    }

    fn request_commentary(&self, ticket: Ticket, verdict: String, player1: Move, player2: Move) {
        let oracle = Arc::clone(&self.oracle);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let text = oracle.request_commentary(&verdict, player1, player2).await;
            complete(&completions, Intent::CommentaryResolved { ticket, text });
        });
    }

    fn start_countdown(&mut self, ticket: Ticket) {
        self.cancel_countdown();
        let completions = self.completions.clone();
        let period = self.tick.max(MIN_TICK);
        self.countdown = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if !complete(&completions, Intent::CountdownTick { ticket }) {
                    break;
                }
            }
        }));
        debug!(%ticket, ?period, "Countdown started");
    }

    fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
            debug!("Countdown cancelled");
        }
    }
}

/// Feeds a completion back into the session queue.
///
/// Returns false once the session is gone.
fn complete(completions: &mpsc::WeakUnboundedSender<Intent>, intent: Intent) -> bool {
    match completions.upgrade() {
        Some(tx) => tx.send(intent).is_ok(),
        None => false,
    }
}

/// Shell-facing handle to a running session.
#[derive(Debug, Clone)]
pub struct ArenaHandle {
    intents: mpsc::UnboundedSender<Intent>,
    snapshots: watch::Receiver<Snapshot>,
}

impl ArenaHandle {
    /// Queues any intent.
    pub fn send(&self, intent: Intent) -> Result<(), ArenaError> {
        self.intents
            .send(intent)
            .map_err(|_| ArenaError::new("Arena session has stopped".to_string()))
    }

    /// Registers both players and leaves pre-registration.
    pub fn register_players(
        &self,
        player1: impl Into<String>,
        player2: impl Into<String>,
        mode: Mode,
    ) -> Result<(), ArenaError> {
        self.send(Intent::RegisterPlayers {
            player1: player1.into(),
            player2: player2.into(),
            mode,
        })
    }

    /// Starts a round, or returns to idle after a result.
    pub fn start_round(&self) -> Result<(), ArenaError> {
        self.send(Intent::StartRound)
    }

    /// Chooses a move for a human slot.
    pub fn choose_move(&self, slot: Slot, choice: Move) -> Result<(), ArenaError> {
        self.send(Intent::ChooseMove { slot, choice })
    }

    /// Abandons the match.
    pub fn reset_match(&self) -> Result<(), ArenaError> {
        self.send(Intent::ResetMatch)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Waits until a published snapshot satisfies `predicate`.
    pub async fn wait_for(&self, predicate: impl FnMut(&Snapshot) -> bool) -> Result<Snapshot, ArenaError> {
        let mut rx = self.snapshots.clone();
        rx.wait_for(predicate)
            .await
            .map(|snapshot| snapshot.clone())
            .map_err(|_| ArenaError::new("Arena session has stopped".to_string()))
    }
}

/// Error talking to an arena session.
#[derive(Debug, Clone, Display, Error)]
#[display("Arena error: {} at {}:{}", message, file, line)]
pub struct ArenaError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ArenaError {
    /// Creates a new arena error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
