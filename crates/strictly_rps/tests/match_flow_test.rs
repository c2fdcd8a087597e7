//! Scenario tests for the match state machine.

use strictly_rps::{
    Effect, HISTORY_LIMIT, Intent, Match, Mode, Move, Outcome, Phase, Rejection, Slot, Snapshot,
};

fn register(game: &mut Match, mode: Mode) {
    game.apply(Intent::RegisterPlayers {
        player1: "Striker".to_string(),
        player2: "Gemini AI".to_string(),
        mode,
    })
    .expect("registration should be accepted");
}

fn finish_countdown(game: &mut Match) {
    let ticket = game.ticket();
    while game.phase() == Phase::Resolving {
        game.apply(Intent::CountdownTick { ticket })
            .expect("tick should be accepted while resolving");
    }
}

/// Plays a full human-vs-human round and returns to idle.
fn play_pvp_round(game: &mut Match, p1: Move, p2: Move) {
    game.apply(Intent::StartRound).unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player1,
        choice: p1,
    })
    .unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player2,
        choice: p2,
    })
    .unwrap();
    finish_countdown(game);
    game.apply(Intent::StartRound).unwrap();
}

#[test]
fn test_ai_round_player1_wins() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsAi);
    game.apply(Intent::StartRound).unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player1,
        choice: Move::Rock,
    })
    .unwrap();

    let effects = game
        .apply(Intent::OracleMoveResolved {
            ticket: game.ticket(),
            choice: Move::Scissors,
        })
        .unwrap();
    assert!(matches!(effects.as_slice(), [Effect::StartCountdown { .. }]));
    assert!(!*game.snapshot().oracle_pending());
    finish_countdown(&mut game);

    let snap = game.snapshot();
    assert_eq!(*snap.phase(), Phase::Result);
    assert_eq!(*snap.scores().player1(), 1);
    assert_eq!(*snap.scores().player2(), 0);
    assert_eq!(snap.history().len(), 1);
    let record = &snap.history()[0];
    assert_eq!(*record.player1(), Move::Rock);
    assert_eq!(*record.player2(), Move::Scissors);
    assert_eq!(*record.outcome(), Outcome::Player1);
    assert_eq!(record.verdict(), "Striker Wins!");
}

#[test]
fn test_paper_beats_rock_and_draw_keeps_scores() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsHuman);

    play_pvp_round(&mut game, Move::Paper, Move::Rock);
    assert_eq!(*game.scores().player1(), 1);

    play_pvp_round(&mut game, Move::Rock, Move::Rock);
    assert_eq!(*game.scores().player1(), 1);
    assert_eq!(*game.scores().player2(), 0);
    assert_eq!(
        game.history().latest().map(|r| r.verdict().as_str()),
        Some("It's a draw!")
    );
}

#[test]
fn test_second_choice_rejected_while_oracle_pending() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsAi);
    game.apply(Intent::StartRound).unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player1,
        choice: Move::Paper,
    })
    .unwrap();
    let before = game.snapshot();

    let err = game
        .apply(Intent::ChooseMove {
            slot: Slot::Player1,
            choice: Move::Scissors,
        })
        .unwrap_err();

    assert_eq!(err, Rejection::SlotFilled(Slot::Player1));
    assert_eq!(game.snapshot(), before);
    assert_eq!(*before.player1_move(), Some(Move::Paper));
    assert_eq!(*before.phase(), Phase::Selecting);
}

#[test]
fn test_history_evicts_oldest_after_six_rounds() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsHuman);
    let rounds = [
        (Move::Rock, Move::Paper),
        (Move::Paper, Move::Paper),
        (Move::Scissors, Move::Paper),
        (Move::Rock, Move::Scissors),
        (Move::Paper, Move::Scissors),
        (Move::Scissors, Move::Scissors),
    ];
    let first_ticket = game.ticket().next();
    for (p1, p2) in rounds {
        play_pvp_round(&mut game, p1, p2);
    }

    let snap = game.snapshot();
    assert_eq!(snap.history().len(), HISTORY_LIMIT);
    assert!(snap.history().iter().all(|r| *r.ticket() != first_ticket));
    let tickets: Vec<_> = snap.history().iter().map(|r| *r.ticket()).collect();
    let mut sorted = tickets.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(tickets, sorted, "history must be most recent first");
    assert_eq!(*snap.history()[0].player1(), Move::Scissors);
}

#[test]
fn test_pvp_either_player_may_choose_first() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsHuman);
    game.apply(Intent::StartRound).unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player2,
        choice: Move::Scissors,
    })
    .unwrap();

    let snap = game.snapshot();
    assert_eq!(*snap.phase(), Phase::Selecting);
    assert_eq!(*snap.awaiting(), Some(Slot::Player1));
    assert_eq!(
        snap.commentary(),
        "Gemini AI has chosen. Waiting for Striker..."
    );

    game.apply(Intent::ChooseMove {
        slot: Slot::Player1,
        choice: Move::Rock,
    })
    .unwrap();
    assert_eq!(game.phase(), Phase::Resolving);
}

#[test]
fn test_reset_during_resolving_cancels_round() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsHuman);
    game.apply(Intent::StartRound).unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player1,
        choice: Move::Rock,
    })
    .unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player2,
        choice: Move::Scissors,
    })
    .unwrap();
    let ticket = game.ticket();

    let effects = game.apply(Intent::ResetMatch).unwrap();
    assert_eq!(effects, vec![Effect::CancelCountdown]);

    for _ in 0..5 {
        assert!(game.apply(Intent::CountdownTick { ticket }).is_err());
    }
    let snap = game.snapshot();
    assert_eq!(*snap.phase(), Phase::PreRegistration);
    assert!(snap.history().is_empty());
    assert_eq!(*snap.scores().player1(), 0);
}

#[test]
fn test_stale_oracle_move_after_reset_ignored() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsAi);
    game.apply(Intent::StartRound).unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player1,
        choice: Move::Rock,
    })
    .unwrap();
    let ticket = game.ticket();

    game.apply(Intent::ResetMatch).unwrap();
    register(&mut game, Mode::HumanVsAi);
    game.apply(Intent::StartRound).unwrap();

    let err = game
        .apply(Intent::OracleMoveResolved {
            ticket,
            choice: Move::Paper,
        })
        .unwrap_err();
    assert!(matches!(err, Rejection::StaleTicket { .. }));
    assert_eq!(*game.snapshot().player2_move(), None);
}

#[test]
fn test_reset_is_idempotent() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsHuman);
    play_pvp_round(&mut game, Move::Paper, Move::Rock);

    game.apply(Intent::ResetMatch).unwrap();
    let once = game.snapshot();
    game.apply(Intent::ResetMatch).unwrap();
    let twice = game.snapshot();

    assert_eq!(once, twice);
    assert_eq!(once, Snapshot::default());
}

#[test]
fn test_start_round_rejected_while_selecting() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsHuman);
    game.apply(Intent::StartRound).unwrap();
    let ticket = game.ticket();

    assert!(matches!(
        game.apply(Intent::StartRound),
        Err(Rejection::WrongPhase { .. })
    ));
    assert_eq!(game.ticket(), ticket);
}

#[test]
fn test_moves_ignored_after_finalization() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsHuman);
    game.apply(Intent::StartRound).unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player1,
        choice: Move::Rock,
    })
    .unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player2,
        choice: Move::Paper,
    })
    .unwrap();
    finish_countdown(&mut game);
    let ticket = game.ticket();

    assert!(game.apply(Intent::CountdownTick { ticket }).is_err());
    assert!(
        game.apply(Intent::ChooseMove {
            slot: Slot::Player1,
            choice: Move::Scissors,
        })
        .is_err()
    );
    assert_eq!(*game.scores().player2(), 1);
    assert_eq!(game.history().len(), 1);
}

#[test]
fn test_commentary_attaches_to_round() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsHuman);
    game.apply(Intent::StartRound).unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player1,
        choice: Move::Scissors,
    })
    .unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player2,
        choice: Move::Paper,
    })
    .unwrap();
    finish_countdown(&mut game);

    game.apply(Intent::CommentaryResolved {
        ticket: game.ticket(),
        text: "Snip snip!".to_string(),
    })
    .unwrap();

    let snap = game.snapshot();
    assert_eq!(snap.commentary(), "Snip snip!");
    assert_eq!(
        snap.history()[0].commentary().as_deref(),
        Some("Snip snip!")
    );
}

#[test]
fn test_result_returns_to_idle() {
    let mut game = Match::new();
    register(&mut game, Mode::HumanVsHuman);
    game.apply(Intent::StartRound).unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player1,
        choice: Move::Rock,
    })
    .unwrap();
    game.apply(Intent::ChooseMove {
        slot: Slot::Player2,
        choice: Move::Rock,
    })
    .unwrap();
    finish_countdown(&mut game);
    assert_eq!(game.phase(), Phase::Result);

    game.apply(Intent::StartRound).unwrap();
    let snap = game.snapshot();
    assert_eq!(*snap.phase(), Phase::Idle);
    assert_eq!(*snap.player1_move(), None);
    assert_eq!(*snap.player2_move(), None);
}
