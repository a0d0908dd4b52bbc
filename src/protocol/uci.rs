//! UCI (Universal Chess Interface) protocol adapter: `uci`, `isready`,
//! `ucinewgame`, `position`, `go`, `stop`, `setoption`, `quit`.

use std::io::BufRead;
use std::sync::mpsc::TryRecvError;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::engine::{Command, CommandOutcome, Engine};
use crate::search::SearchStats;
use crate::time::{GoRequest, TimeControl};

use super::{spawn_line_reader, OutputSink};

const POLL_INTERVAL: Duration = Duration::from_millis(5);
const ENGINE_NAME: &str = "chess_engine";
const ENGINE_AUTHOR: &str = "the chess_engine contributors";

/// Runs the UCI read-eval loop against `input` until `quit` or end of
/// input.
pub fn run(input: impl BufRead + Send + 'static, sink: &OutputSink, config: EngineConfig) {
    let mut engine = Engine::new(config);
    let lines = spawn_line_reader(input);

    loop {
        if let Some(outcome) = engine.poll() {
            report(&outcome, sink);
        }

        let trimmed = match lines.try_recv() {
            Ok(line) => line,
            Err(TryRecvError::Empty) => {
                std::thread::sleep(POLL_INTERVAL);
                continue;
            }
            Err(TryRecvError::Disconnected) => break,
        };
        if trimmed.is_empty() {
            continue;
        }
        let parts: Vec<&str> = trimmed.split_whitespace().collect();

        match parts[0] {
            "quit" => break,
            "uci" => {
                sink.line(&format!("id name {ENGINE_NAME}"));
                sink.line(&format!("id author {ENGINE_AUTHOR}"));
                sink.line("option name Hash type spin default 64 min 1 max 65536");
                sink.line("option name UCI_Chess960 type check default false");
                sink.line("option name use_san type check default false");
                sink.line("uciok");
            }
            "isready" => sink.line("readyok"),
            "ucinewgame" => {
                ensure_observing(&mut engine);
                let _ = engine.dispatch(Command::New);
                let _ = engine.dispatch(Command::Force);
            }
            "position" => handle_position(&mut engine, &parts),
            "go" => handle_go(&mut engine, &parts, sink),
            "stop" => {
                let _ = engine.dispatch(Command::Stop);
            }
            "setoption" => handle_setoption(&mut engine, &parts),
            _ => {}
        }
    }

    if engine.state_name() == "searching" {
        let _ = engine.dispatch(Command::Stop);
    }
}

/// `force` is only valid from `Waiting`; applying it unconditionally
/// from `Observing` would be rejected, so check first.
fn ensure_observing(engine: &mut Engine) {
    if engine.state_name() == "waiting" {
        let _ = engine.dispatch(Command::Force);
    }
}

fn handle_position(engine: &mut Engine, parts: &[&str]) {
    ensure_observing(engine);
    let mut i = 1;
    if parts.get(i) == Some(&"startpos") {
        let _ = engine.dispatch(Command::SetFen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string()));
        i += 1;
    } else if parts.get(i) == Some(&"fen") {
        if i + 6 < parts.len() {
            let fen = parts[i + 1..i + 7].join(" ");
            let _ = engine.dispatch(Command::SetFen(fen));
            i += 7;
        } else {
            return;
        }
    } else {
        return;
    }

    if parts.get(i) == Some(&"moves") {
        i += 1;
        while i < parts.len() {
            let _ = engine.dispatch(Command::UserMove(parts[i].to_string()));
            i += 1;
        }
    }
}

fn handle_go(engine: &mut Engine, parts: &[&str], sink: &OutputSink) {
    let mut req = GoRequest::default();
    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                req.depth = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "nodes" => {
                req.nodes = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "movetime" => {
                req.move_time = parts.get(i + 1).and_then(|s| s.parse().ok()).map(Duration::from_millis);
                i += 2;
            }
            "wtime" => {
                req.white_time = parts.get(i + 1).and_then(|s| s.parse().ok()).map(Duration::from_millis);
                i += 2;
            }
            "btime" => {
                req.black_time = parts.get(i + 1).and_then(|s| s.parse().ok()).map(Duration::from_millis);
                i += 2;
            }
            "winc" => {
                req.white_increment = parts.get(i + 1).and_then(|s| s.parse().ok()).map(Duration::from_millis);
                i += 2;
            }
            "binc" => {
                req.black_increment = parts.get(i + 1).and_then(|s| s.parse().ok()).map(Duration::from_millis);
                i += 2;
            }
            "movestogo" => {
                req.moves_to_go = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "infinite" => {
                req.infinite = true;
                i += 1;
            }
            _ => i += 1,
        }
    }

    if req.white_time.is_some() {
        let _ = engine.dispatch(Command::SetTimeControl(if req.white_increment.is_some() {
            TimeControl::Incremental
        } else {
            TimeControl::Conventional { moves_per_block: req.moves_to_go.unwrap_or(40) }
        }));
    }

    match engine.dispatch(Command::Go(req)) {
        Ok(_) => {}
        Err(e) => {
            #[cfg(feature = "logging")]
            log::warn!("go command rejected: {e}");
            sink.line(&format!("info string {e}"));
        }
    }
}

fn handle_setoption(engine: &mut Engine, parts: &[&str]) {
    let mut name_parts = Vec::new();
    let mut value_parts = Vec::new();
    let mut mode = "";
    for part in &parts[1..] {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(*part),
                "value" => value_parts.push(*part),
                _ => {}
            },
        }
    }
    if name_parts.is_empty() {
        return;
    }
    let name = name_parts.join(" ");
    let value = value_parts.join(" ");
    let _ = engine.dispatch(Command::SetOption(name, value));
}

fn info_line(stats: &SearchStats) -> String {
    format!(
        "info depth {} nodes {} time {} nps {}",
        stats.depth,
        stats.nodes,
        stats.time.as_millis(),
        (stats.nodes as f64 / stats.time.as_secs_f64().max(0.001)) as u64,
    )
}

fn report(outcome: &CommandOutcome, sink: &OutputSink) {
    if let CommandOutcome::MoveMade { notation, stats } = outcome {
        if let Some(stats) = stats {
            sink.line(&info_line(stats));
        }
        sink.line(&format!("bestmove {notation}"));
    }
}
