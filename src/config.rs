//! Engine configuration: defaults overridden by CLI flags, then
//! mutated in place by protocol `setoption`/`option` commands.

use clap::{Parser, ValueEnum};

/// Which wire dialect the binary speaks on stdin/stdout.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// UCI, as spoken by most modern GUIs.
    #[default]
    Uci,
    /// The shell-like `display`/`usermove`/`force` dialect.
    Cli,
}

/// Command-line flags accepted by the engine binaries.
#[derive(Parser, Debug, Clone)]
#[command(name = "chess-engine", about = "A bitboard chess engine core")]
pub struct Cli {
    /// Wire dialect to speak on stdin/stdout.
    #[arg(long, value_enum, default_value_t = Protocol::Uci)]
    pub protocol: Protocol,

    /// Transposition table size in megabytes.
    #[arg(long, default_value_t = 64)]
    pub hash: usize,

    /// Accept and emit Chess960/Shredder-FEN castling notation.
    #[arg(long, default_value_t = false)]
    pub uci_chess960: bool,

    /// Report moves in Standard Algebraic Notation instead of
    /// coordinate notation on the CLI dialect.
    #[arg(long, default_value_t = false)]
    pub use_san: bool,

    /// Worker threads used by the parallel `perft` command.
    #[arg(long, default_value_t = 1)]
    pub perft_threads: usize,

    /// Milliseconds subtracted from every computed time budget to
    /// absorb GUI/engine communication latency.
    #[arg(long, default_value_t = 50)]
    pub move_overhead_ms: u64,
}

/// The engine's live configuration. Constructed once from [`Cli`]
/// defaults, then mutated by `setoption`/`option` commands behind the
/// engine's state-machine lock.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub hash_mb: usize,
    pub uci_chess960: bool,
    pub use_san: bool,
    pub perft_threads: usize,
    pub move_overhead_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { hash_mb: 64, uci_chess960: false, use_san: false, perft_threads: 1, move_overhead_ms: 50 }
    }
}

impl From<Cli> for EngineConfig {
    fn from(cli: Cli) -> Self {
        EngineConfig {
            hash_mb: cli.hash,
            uci_chess960: cli.uci_chess960,
            use_san: cli.use_san,
            perft_threads: cli.perft_threads,
            move_overhead_ms: cli.move_overhead_ms,
        }
    }
}

impl EngineConfig {
    /// Applies a single `name`/`value` option pair, as received from a
    /// protocol adapter's `setoption`/`option` command. Unknown option
    /// names are ignored, matching common UCI engine behavior.
    pub fn apply_option(&mut self, name: &str, value: &str) {
        match name {
            "Hash" | "tt_size" => {
                if let Ok(mb) = value.parse() {
                    self.hash_mb = mb;
                }
            }
            "UCI_Chess960" => self.uci_chess960 = value.eq_ignore_ascii_case("true"),
            "use_san" => self.use_san = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }
}
