//! Time-control variants selectable for a search.

use std::time::Duration;

/// Which of the three supported time-control shapes governs the
/// current game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeControl {
    /// A fixed budget for this move alone (`go movetime N`).
    PerMove,
    /// Base time plus an increment added after each move.
    Incremental,
    /// A fixed number of moves per time block, clock replenished at
    /// each block boundary.
    Conventional { moves_per_block: u32 },
}

/// A fully-resolved search depth/time request, as handed from a
/// protocol adapter to the engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct GoRequest {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub move_time: Option<Duration>,
    pub white_time: Option<Duration>,
    pub black_time: Option<Duration>,
    pub white_increment: Option<Duration>,
    pub black_increment: Option<Duration>,
    pub moves_to_go: Option<u32>,
    pub infinite: bool,
}
