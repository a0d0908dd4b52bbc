//! Shell-like CLI dialect: `display`, `fen`, `usermove`, `go`, `force`,
//! `stop`, `new`, `perft`, `sd`, `st`, `level`, `options`, `option`,
//! `exit`. Grounded in `m8`'s interactive shell interface.

use std::io::BufRead;
use std::sync::mpsc::TryRecvError;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::engine::{Command, CommandOutcome, Engine};
use crate::time::{GoRequest, TimeControl};

use super::{spawn_line_reader, OutputSink};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Runs the CLI read-eval loop against `input` until `exit`/`quit` or
/// end of input, printing all output through `sink`. Input is read on
/// a background thread so a completed search can be reported as soon
/// as it finishes rather than only after the next command line.
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
        let mut parts = trimmed.split_whitespace();
        let Some(cmd) = parts.next() else { continue };
        let args: Vec<&str> = parts.collect();

        match cmd {
            "exit" | "quit" => break,
            "help" => sink.line("commands: display fen usermove go force stop new perft sd st level options option exit"),
            "display" => sink.line(&engine.board().to_xfen(engine.config().uci_chess960)),
            "fen" => dispatch(&mut engine, Command::SetFen(args.join(" ")), sink),
            "usermove" => {
                if let Some(notation) = args.first() {
                    dispatch(&mut engine, Command::UserMove((*notation).to_string()), sink);
                }
            }
            "go" => dispatch(&mut engine, Command::Go(GoRequest::default()), sink),
            "force" => dispatch(&mut engine, Command::Force, sink),
            "stop" => dispatch(&mut engine, Command::Stop, sink),
            "new" => dispatch(&mut engine, Command::New, sink),
            "perft" => {
                if let Some(depth) = args.first().and_then(|s| s.parse().ok()) {
                    dispatch(&mut engine, Command::Perft(depth), sink);
                }
            }
            "sd" => {
                if let Some(depth) = args.first().and_then(|s| s.parse().ok()) {
                    dispatch(&mut engine, Command::SetDepth(depth), sink);
                }
            }
            "st" => {
                if let Some(secs) = args.first().and_then(|s| s.parse::<u64>().ok()) {
                    dispatch(&mut engine, Command::SetMoveTime(Duration::from_secs(secs)), sink);
                }
            }
            "level" => {
                if let [mps, _base, _inc] = args.as_slice() {
                    if let Ok(moves_per_block) = mps.parse() {
                        dispatch(&mut engine, Command::SetTimeControl(TimeControl::Conventional { moves_per_block }), sink);
                    }
                }
            }
            "options" => sink.line(&format!("{:?}", engine.config())),
            "option" => {
                if let [name, value] = args.as_slice() {
                    dispatch(&mut engine, Command::SetOption((*name).to_string(), (*value).to_string()), sink);
                }
            }
            _ => sink.line(&format!("unknown command: {cmd}")),
        }
    }

    if engine.state_name() == "searching" {
        let _ = engine.dispatch(Command::Stop);
    }
}

fn dispatch(engine: &mut Engine, command: Command, sink: &OutputSink) {
    match engine.dispatch(command) {
        Ok(outcome) => report(&outcome, sink),
        Err(e) => {
            #[cfg(feature = "logging")]
            log::warn!("command rejected: {e}");
            sink.line(&format!("error: {e}"));
        }
    }
}

fn report(outcome: &CommandOutcome, sink: &OutputSink) {
    match outcome {
        CommandOutcome::MoveMade { notation, .. } => sink.line(&format!("move {notation}")),
        CommandOutcome::PerftResult(nodes) => sink.line(&format!("perft: {nodes} nodes")),
        CommandOutcome::SearchStarted | CommandOutcome::SearchStopped | CommandOutcome::PerftStarted | CommandOutcome::Ok => {}
    }
}
