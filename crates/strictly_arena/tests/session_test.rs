//! End-to-end tests of the arena session with a scripted oracle.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use strictly_arena::{ArenaHandle, ArenaSession, CountdownSettings, MoveOracle};
use strictly_rps::{Mode, Move, MovePair, Outcome, Phase, Slot, Snapshot};
use tokio::sync::Notify;

const GUARD: Duration = Duration::from_secs(5);

/// Oracle that always plays the same move, optionally waiting for a gate.
struct ScriptedOracle {
    choice: Move,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl MoveOracle for ScriptedOracle {
    async fn request_move(&self, _recent: &[MovePair]) -> Move {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.choice
    }

    async fn request_commentary(&self, verdict: &str, _player1: Move, _player2: Move) -> String {
        format!("Commentary: {verdict}")
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn fast() -> CountdownSettings {
    CountdownSettings {
        from: 3,
        tick: Duration::from_millis(5),
    }
}

async fn wait(arena: &ArenaHandle, predicate: impl FnMut(&Snapshot) -> bool) -> Snapshot {
    tokio::time::timeout(GUARD, arena.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("session stopped")
}

#[tokio::test]
async fn test_forced_oracle_round() {
    let oracle = Arc::new(ScriptedOracle {
        choice: Move::Scissors,
        gate: None,
    });
    let (arena, _task) = ArenaSession::spawn(oracle, fast());

    arena
        .register_players("Striker", "Gemini AI", Mode::HumanVsAi)
        .unwrap();
    arena.start_round().unwrap();
    arena.choose_move(Slot::Player1, Move::Rock).unwrap();

    let result = wait(&arena, |s| *s.phase() == Phase::Result).await;
    assert_eq!(*result.scores().player1(), 1);
    assert_eq!(*result.scores().player2(), 0);
    assert_eq!(result.history().len(), 1);
    assert_eq!(*result.history()[0].player2(), Move::Scissors);
    assert_eq!(*result.history()[0].outcome(), Outcome::Player1);
    assert_eq!(result.history()[0].verdict(), "Striker Wins!");

    let commented = wait(&arena, |s| {
        s.history()
            .first()
            .is_some_and(|r| r.commentary().is_some())
    })
    .await;
    assert_eq!(commented.commentary(), "Commentary: Striker Wins!");
}

#[tokio::test]
async fn test_pending_oracle_blocks_second_choice() {
    let gate = Arc::new(Notify::new());
    let oracle = Arc::new(ScriptedOracle {
        choice: Move::Rock,
        gate: Some(Arc::clone(&gate)),
    });
    let (arena, _task) = ArenaSession::spawn(oracle, fast());

    arena
        .register_players("Striker", "Gemini AI", Mode::HumanVsAi)
        .unwrap();
    arena.start_round().unwrap();
    arena.choose_move(Slot::Player1, Move::Paper).unwrap();

    let pending = wait(&arena, |s| *s.oracle_pending()).await;
    assert_eq!(*pending.phase(), Phase::Selecting);
    assert_eq!(*pending.awaiting(), Some(Slot::Player2));

    arena.choose_move(Slot::Player1, Move::Scissors).unwrap();
    arena.choose_move(Slot::Player2, Move::Scissors).unwrap();
    gate.notify_one();

    let result = wait(&arena, |s| *s.phase() == Phase::Result).await;
    assert!(!*result.oracle_pending());
    assert_eq!(*result.player1_move(), Some(Move::Paper));
    assert_eq!(*result.player2_move(), Some(Move::Rock));
    assert_eq!(*result.scores().player1(), 1);
}

#[tokio::test]
async fn test_reset_during_countdown_discards_round() {
    let oracle = Arc::new(ScriptedOracle {
        choice: Move::Rock,
        gate: None,
    });
    let slow = CountdownSettings {
        from: 3,
        tick: Duration::from_millis(100),
    };
    let (arena, _task) = ArenaSession::spawn(oracle, slow);

    arena
        .register_players("Ada", "Grace", Mode::HumanVsHuman)
        .unwrap();
    arena.start_round().unwrap();
    arena.choose_move(Slot::Player1, Move::Paper).unwrap();
    arena.choose_move(Slot::Player2, Move::Rock).unwrap();
    wait(&arena, |s| *s.phase() == Phase::Resolving).await;

    arena.reset_match().unwrap();
    arena
        .register_players("Ada", "Grace", Mode::HumanVsHuman)
        .unwrap();
    wait(&arena, |s| *s.phase() == Phase::Idle).await;

    tokio::time::sleep(Duration::from_millis(600)).await;
    let snap = arena.snapshot();
    assert_eq!(*snap.phase(), Phase::Idle);
    assert!(snap.history().is_empty());
    assert_eq!(*snap.scores().player1(), 0);
}

#[tokio::test]
async fn test_countdown_is_published() {
    let oracle = Arc::new(ScriptedOracle {
        choice: Move::Rock,
        gate: None,
    });
    let (arena, _task) = ArenaSession::spawn(
        oracle,
        CountdownSettings {
            from: 2,
            tick: Duration::from_millis(20),
        },
    );
    arena
        .register_players("Ada", "Grace", Mode::HumanVsHuman)
        .unwrap();
    arena.start_round().unwrap();
    arena.choose_move(Slot::Player1, Move::Rock).unwrap();
    arena.choose_move(Slot::Player2, Move::Rock).unwrap();

    let resolving = wait(&arena, |s| *s.phase() == Phase::Resolving).await;
    assert!(resolving.countdown().is_some());

    let result = wait(&arena, |s| *s.phase() == Phase::Result).await;
    assert!(result.countdown().is_none());
    assert_eq!(*result.scores().player1(), 0);
    assert_eq!(*result.scores().player2(), 0);
    assert_eq!(result.history()[0].verdict(), "It's a draw!");
}

#[tokio::test]
async fn test_session_stops_when_handles_drop() {
    let oracle = Arc::new(ScriptedOracle {
        choice: Move::Rock,
        gate: None,
    });
    let (arena, task) = ArenaSession::spawn(oracle, fast());
    drop(arena);
    tokio::time::timeout(GUARD, task)
        .await
        .expect("session should stop")
        .expect("session task should not panic");
}

#[tokio::test]
async fn test_zero_tick_countdown_still_finishes() {
    let oracle = Arc::new(ScriptedOracle {
        choice: Move::Rock,
        gate: None,
    });
    let (arena, _task) = ArenaSession::spawn(oracle, CountdownSettings::new(3, Duration::ZERO));
    arena
        .register_players("Ada", "Grace", Mode::HumanVsHuman)
        .unwrap();
    arena.start_round().unwrap();
    arena.choose_move(Slot::Player1, Move::Scissors).unwrap();
    arena.choose_move(Slot::Player2, Move::Paper).unwrap();

    let result = wait(&arena, |s| *s.phase() == Phase::Result).await;
    assert_eq!(*result.scores().player1(), 1);
    assert_eq!(result.history()[0].verdict(), "Ada Wins!");
}
