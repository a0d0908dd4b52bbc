//! Protocol adapters translate a wire dialect's command syntax into
//! [`crate::engine::Command`]s and render outcomes back out. Output
//! from both the read loop and the engine's background poll is
//! serialized through a single [`OutputSink`].

pub mod cli;
pub mod uci;

use std::io::{BufRead, Write};
use std::sync::mpsc::Receiver;
use std::sync::Mutex;

/// Serializes all user-visible text onto stdout.
pub struct OutputSink {
    stdout: Mutex<std::io::Stdout>,
}

impl OutputSink {
    #[must_use]
    pub fn new() -> Self {
        OutputSink { stdout: Mutex::new(std::io::stdout()) }
    }

    pub fn line(&self, text: &str) {
        let mut out = self.stdout.lock().expect("stdout mutex poisoned");
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads `input` line by line on a dedicated thread, handing each
/// trimmed line back over a channel. Lets a protocol's main loop poll
/// the engine for search/perft completion between lines instead of
/// blocking on stdin until the next command arrives.
pub(crate) fn spawn_line_reader<R: BufRead + Send + 'static>(mut input: R) -> Receiver<String> {
    let (sender, receiver) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        loop {
            line.clear();
            match input.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if sender.send(line.trim_end().to_string()).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    receiver
}
