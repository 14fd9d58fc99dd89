use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{arg, command, ArgMatches, Command};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chess_referee::chess_boards::chess_board::fen::INITIAL_POSITION;
use chess_referee::chess_boards::chess_board::{parse_san, ChessBoard};
use chess_referee::chess_boards::perft::perft_divide;
use chess_referee::history::GameHistory;
use chess_referee::movers::{ExternalMover, RandomMover, ScriptedMover, UciEngineMover};
use chess_referee::{Color, GameSession, NotationMode, SessionConfig, SessionState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("chess_referee=info".parse()?))
        .init();

    let matches = command!()
        .propagate_version(true)
        .arg(arg!(--strict "Require exact standard algebraic notation").global(true))
        .subcommand(play_command())
        .subcommand(
            Command::new("replay")
                .about("Validate a move list and show the resulting game")
                .arg(arg!(-f --fen <FEN> "Start position").default_value(INITIAL_POSITION))
                .arg(arg!(<MOVES> ... "Moves of the game").required(false)),
        )
        .subcommand(
            Command::new("perft")
                .about("Run Perft test")
                .arg(arg!(-f --fen <FEN> "Board position").default_value(INITIAL_POSITION))
                .arg(
                    arg!(-x --depth <d> "depth")
                        .default_value("3")
                        .value_parser(clap::value_parser!(u8)),
                )
                .arg(arg!(-m --moves <moves> "List of moves").num_args(1..)),
        )
        .get_matches();

    let notation = if matches.get_flag("strict") {
        NotationMode::Strict
    } else {
        NotationMode::Lenient
    };

    match matches.subcommand() {
        Some(("play", arg_matches)) => play(arg_matches, notation).await,
        Some(("replay", arg_matches)) => replay(arg_matches, notation),
        Some(("perft", arg_matches)) => perft(arg_matches),
        _ => play(&play_command().get_matches_from(["play"]), notation).await,
    }
}

fn play_command() -> Command {
    Command::new("play")
        .about("Play a game against an external mover")
        .arg(
            arg!(--mover <KIND> "Who replies: random, uci or script")
                .value_parser(["random", "uci", "script"])
                .default_value("random"),
        )
        .arg(arg!(--engine <PATH> "UCI engine executable, for --mover uci"))
        .arg(
            arg!(--movetime <MS> "Engine thinking time per move in milliseconds")
                .default_value("500")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            arg!(--seed <SEED> "Seed of the random mover")
                .default_value("42")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(arg!(--script <MOVES> "Replies of the scripted mover").num_args(1..))
        .arg(
            arg!(--timeout <SECS> "Seconds to wait for a reply")
                .default_value("30")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            arg!(--color <COLOR> "Side you play")
                .value_parser(["white", "black"])
                .default_value("white"),
        )
        .arg(arg!(-f --fen <FEN> "Start position"))
}

async fn play(arg_matches: &ArgMatches, notation: NotationMode) -> anyhow::Result<()> {
    let human_color = match arg_matches.get_one::<String>("color").map(String::as_str) {
        Some("black") => Color::Black,
        _ => Color::White,
    };
    let config = SessionConfig {
        human_color,
        reply_timeout: Duration::from_secs(arg_matches.get_one::<u64>("timeout").copied().unwrap_or(30)),
        notation,
    };
    let start = match arg_matches.get_one::<String>("fen") {
        Some(fen) => ChessBoard::from_fen(fen).with_context(|| format!("invalid start position '{}'", fen))?,
        None => ChessBoard::starting_position(),
    };

    let seed = arg_matches.get_one::<u64>("seed").copied().unwrap_or(42);
    let mover: Box<dyn ExternalMover> = match arg_matches.get_one::<String>("mover").map(String::as_str) {
        Some("uci") => {
            let Some(path) = arg_matches.get_one::<String>("engine") else {
                bail!("--mover uci needs --engine <PATH>");
            };
            let movetime = Duration::from_millis(arg_matches.get_one::<u64>("movetime").copied().unwrap_or(500));
            let engine = UciEngineMover::spawn(path, movetime)
                .await
                .with_context(|| format!("could not start engine '{}'", path))?;
            Box::new(engine.with_start_position(start.clone()))
        }
        Some("script") => Box::new(ScriptedMover::new(
            arg_matches.get_many::<String>("script").unwrap_or_default().cloned(),
        )),
        _ => Box::new(RandomMover::from_position(seed, start.clone())),
    };

    let mut session = GameSession::with_start_fen(mover, config, &start.to_fen())?;
    run_interactive(&mut session).await?;
    session.into_mover().shutdown().await?;
    Ok(())
}

async fn run_interactive(session: &mut GameSession<Box<dyn ExternalMover>>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Commands: a move, 'moves', 'board', 'status', 'history', 'reset', 'quit'");
    println!("{}", session.board().render_to_string());

    loop {
        match session.state() {
            SessionState::AwaitingReply => {
                match session.request_reply().await {
                    Ok(accepted) => {
                        println!("{} plays {}", session.mover().name(), accepted.san);
                        println!("{}", session.board().render_to_string());
                        println!("{}", accepted.status.message);
                    }
                    Err(error) => {
                        println!("{:#}", anyhow::Error::from(error));
                        println!("Press enter to ask again, or type 'quit'");
                        match lines.next_line().await? {
                            Some(line) if line.trim() == "quit" => return Ok(()),
                            Some(_) => {}
                            None => return Ok(()),
                        }
                    }
                }
                continue;
            }
            SessionState::Terminal(termination) => {
                println!("{}", termination.message());
                prompt("Play again? [y/N] ")?;
                match lines.next_line().await? {
                    Some(line) if line.trim().eq_ignore_ascii_case("y") => {
                        session.reset();
                        println!("{}", session.board().render_to_string());
                        continue;
                    }
                    _ => return Ok(()),
                }
            }
            SessionState::AwaitingHumanMove => {}
        }

        prompt("> ")?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        match line.trim() {
            "" => {}
            "quit" | "exit" => return Ok(()),
            "moves" => println!("{}", session.legal_moves().join(" ")),
            "board" => println!("{}", session.board().render_to_string()),
            "status" => println!("{}", serde_json::to_string_pretty(&session.status())?),
            "history" => println!("{}", history_table(session.history())),
            "reset" => {
                session.reset();
                println!("{}", session.board().render_to_string());
            }
            text => match session.apply_human_move(text) {
                Ok(accepted) => println!("You play {}. {}", accepted.san, accepted.status.message),
                Err(error) => println!("{:#}", anyhow::Error::from(error)),
            },
        }
    }
}

fn prompt(text: &str) -> anyhow::Result<()> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}

#[derive(Tabled)]
struct HistoryRow {
    ply: usize,
    side: Color,
    san: String,
    uci: String,
    fen: String,
}

fn history_table(history: &GameHistory) -> String {
    let mut side = history.start().active_color;
    let rows: Vec<HistoryRow> = history
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let row = HistoryRow {
                ply: index + 1,
                side,
                san: entry.san.clone(),
                uci: entry.mv.as_algebraic(),
                fen: entry.position.to_fen(),
            };
            side = side.opposite();
            row
        })
        .collect();
    Table::new(rows).with(Style::modern()).to_string()
}

fn replay(arg_matches: &ArgMatches, notation: NotationMode) -> anyhow::Result<()> {
    let fen = arg_matches
        .get_one::<String>("fen")
        .map(String::as_str)
        .unwrap_or(INITIAL_POSITION);
    let start = ChessBoard::from_fen(fen).with_context(|| format!("invalid start position '{}'", fen))?;
    let moves: Vec<&String> = arg_matches.get_many::<String>("MOVES").unwrap_or_default().collect();

    let history = GameHistory::replay(start, &moves, notation).context("history does not replay")?;
    println!("{}", history_table(&history));
    println!("{}", history.current().render_to_string());
    match history.termination() {
        Some(termination) => println!("{}", termination.message()),
        None => println!("{} to move", history.current().active_color),
    }
    Ok(())
}

fn perft(arg_matches: &ArgMatches) -> anyhow::Result<()> {
    let fen = arg_matches
        .get_one::<String>("fen")
        .map(String::as_str)
        .unwrap_or(INITIAL_POSITION);
    let depth = arg_matches.get_one::<u8>("depth").copied().unwrap_or(3);
    let moves: Vec<&String> = arg_matches.get_many::<String>("moves").unwrap_or_default().collect();
    println!("Perft test for {} moves {:?} with depth {}", fen, moves, depth);

    let mut chess_board = ChessBoard::from_fen(fen).with_context(|| format!("invalid position '{}'", fen))?;
    for m in moves {
        let mv = parse_san(&chess_board, m, NotationMode::Lenient).with_context(|| format!("invalid move '{}'", m))?;
        chess_board.make_move(mv);
    }

    let result_moves = perft_divide(&chess_board, depth);
    let mut num_nodes = 0;
    for (m, c) in result_moves {
        println!("{}: {}", m, c);
        num_nodes += c;
    }
    println!("\nNodes searched: {}", num_nodes);
    Ok(())
}
