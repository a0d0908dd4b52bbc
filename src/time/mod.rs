//! Chess clocks and the time managers that turn a clock plus a
//! time-control variant into a per-move search budget.

mod clock;
mod control;
mod manager;

pub use clock::{ChessClock, IncrementalClock, MoveTimeClock, MovesPerPeriodClock};
pub use control::{GoRequest, TimeControl};
pub use manager::{
    BudgetPolicy, ConventionalBudgetPolicy, IncrementalBudgetPolicy, PerMoveBudgetPolicy, SearchBudget, TimeManager,
};

use std::time::Duration;

/// Safety margin subtracted from the raw clock reading to absorb
/// communication and scheduling latency before a flag-fall.
pub const SAFETY_MARGIN: Duration = Duration::from_millis(50);
