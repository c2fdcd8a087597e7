//! Line-oriented terminal shell.
//!
//! The shell only translates typed commands into intents and prints
//! snapshots; every rule lives in the match.

use crate::config::ArenaConfig;
use crate::session::ArenaHandle;
use anyhow::Result;
use std::str::FromStr;
use strictly_rps::{Mode, Move, Phase, Slot, Snapshot};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

/// Help text printed on start and on `help`.
pub const HELP: &str = "\
commands:
  register [<p1> <p2>] [ai|human]  enter the arena (default: vs AI)
  start                            start a round / continue after a result
  rock | paper | scissors          choose for the player being prompted
  p1 <move> | p2 <move>            choose for a specific player
  reset                            back to registration
  status                           show the board
  quit";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register players; names default from config.
    Register {
        /// Names given on the line, if any.
        names: Option<(String, String)>,
        /// Requested mode.
        mode: Mode,
    },
    /// Start or continue.
    Start,
    /// Choose a move, for an explicit slot or the prompted one.
    Choose {
        /// Explicit slot, if given.
        slot: Option<Slot>,
        /// The move.
        choice: Move,
    },
    /// Reset the match.
    Reset,
    /// Print the board.
    Status,
    /// Print help.
    Help,
    /// Leave.
    Quit,
}

/// Parses one input line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = words.split_first() else {
        return Err("empty command".to_string());
    };

    match head.to_ascii_lowercase().as_str() {
        "register" | "r" => parse_register(rest),
        "start" | "s" | "next" => Ok(Command::Start),
        "reset" => Ok(Command::Reset),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "p1" | "p2" => {
            let slot = if head.eq_ignore_ascii_case("p1") {
                Slot::Player1
            } else {
                Slot::Player2
            };
            let choice = rest
                .first()
                .and_then(|w| Move::from_str(w).ok())
                .ok_or_else(|| format!("usage: {head} <rock|paper|scissors>"))?;
            Ok(Command::Choose {
                slot: Some(slot),
                choice,
            })
        }
        other => Move::from_str(other)
            .map(|choice| Command::Choose { slot: None, choice })
            .map_err(|_| format!("unknown command: {other}")),
    }
}

fn parse_register(args: &[&str]) -> Result<Command, String> {
    let (names, mode_word) = match args {
        [] => (None, None),
        [mode] => (None, Some(*mode)),
        [p1, p2] => (Some((p1.to_string(), p2.to_string())), None),
        [p1, p2, mode] => (Some((p1.to_string(), p2.to_string())), Some(*mode)),
        _ => return Err("usage: register [<p1> <p2>] [ai|human]".to_string()),
    };
    let mode = match mode_word {
        Some(word) => Mode::from_str(word).map_err(|_| format!("unknown mode: {word}"))?,
        None => Mode::HumanVsAi,
    };
    Ok(Command::Register { names, mode })
}

/// Renders a snapshot as plain text.
pub fn render(snapshot: &Snapshot) -> String {
    let name = |slot| snapshot.name(slot).unwrap_or("?").to_string();
    let mut out = String::new();

    if *snapshot.phase() == Phase::PreRegistration {
        out.push_str(&format!("[{}] \"{}\"", snapshot.phase(), snapshot.commentary()));
        return out;
    }

    out.push_str(&format!(
        "[{}] {} {} - {} {}\n",
        snapshot.phase(),
        name(Slot::Player1),
        snapshot.scores().player1(),
        snapshot.scores().player2(),
        name(Slot::Player2),
    ));

    match snapshot.phase() {
        Phase::Resolving => {
            if let Some(countdown) = snapshot.countdown() {
                out.push_str(&format!("  {countdown}\n"));
            }
        }
        Phase::Selecting => {
            if *snapshot.oracle_pending() {
                out.push_str("  opponent is thinking...\n");
            } else if let Some(slot) = snapshot.awaiting() {
                out.push_str(&format!("  {}'s move\n", name(*slot)));
            }
        }
        Phase::Result => {
            let shown = |m: &Option<Move>| m.map(|m| m.to_string()).unwrap_or_default();
            out.push_str(&format!(
                "  {} vs {}\n",
                shown(snapshot.player1_move()),
                shown(snapshot.player2_move())
            ));
        }
        Phase::Idle | Phase::PreRegistration => {}
    }

    out.push_str(&format!("  \"{}\"", snapshot.commentary()));
    for record in snapshot.history() {
        out.push_str(&format!(
            "\n    {:<8} x {:>8}  {}",
            record.player1().to_string(),
            record.player2().to_string(),
            record.verdict()
        ));
    }
    out
}

/// Runs the shell on stdin/stdout until `quit` or end of input.
#[instrument(skip_all)]
pub async fn run(handle: ArenaHandle, config: &ArenaConfig) -> Result<()> {
    println!("{HELP}\n");
    println!("{}", render(&handle.snapshot()));

    let mut updates = handle.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let text = render(&updates.borrow_and_update());
            println!("{text}");
        }
    });

    let outcome = read_commands(BufReader::new(tokio::io::stdin()), &handle, config).await;
    printer.abort();
    info!("Shell closed");
    outcome
}

/// Feeds commands from `input` to the session until `quit` or end of input.
async fn read_commands<R>(input: R, handle: &ArenaHandle, config: &ArenaConfig) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        debug!(?command, "Shell command");

        match command {
            Command::Register { names, mode } => {
                let (p1, p2) = names.unwrap_or_else(|| {
                    let p2 = match mode {
                        Mode::HumanVsAi => config.player2_name().clone(),
                        Mode::HumanVsHuman => "Player 2".to_string(),
                    };
                    (config.player1_name().clone(), p2)
                });
                handle.register_players(p1, p2, mode)?;
            }
            Command::Start => handle.start_round()?,
            Command::Choose { slot, choice } => {
                let slot = slot
                    .or_else(|| *handle.snapshot().awaiting())
                    .unwrap_or(Slot::Player1);
                handle.choose_move(slot, choice)?;
            }
            Command::Reset => handle.reset_match()?,
            Command::Status => println!("{}", render(&handle.snapshot())),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    Ok(())
}
