//! Turns a clock reading into a target/maximum search time budget,
//! then — as the one Time Manager per search — tracks the search's own
//! progress to decide whether it may continue and when it should next
//! check back in.

use std::time::Duration;

use super::clock::{ChessClock, IncrementalClock, MoveTimeClock, MovesPerPeriodClock};
use super::SAFETY_MARGIN;

/// A target duration to aim for, and a hard maximum the search must
/// never exceed. Produced once per `go`, from the side-to-move's clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchBudget {
    pub target: Duration,
    pub maximum: Duration,
}

impl SearchBudget {
    /// An effectively-unbounded budget, for `go infinite` and for tests
    /// that don't care about wall-clock limits.
    #[must_use]
    pub fn unbounded() -> Self {
        const UNBOUNDED: Duration = Duration::from_secs(3600);
        SearchBudget { target: UNBOUNDED, maximum: UNBOUNDED }
    }
}

/// Computes a [`SearchBudget`] for the side to move, given its clock.
pub trait BudgetPolicy {
    fn compute_budget(&self) -> SearchBudget;
}

/// `go movetime N`: spend the whole allotment minus a safety margin.
pub struct PerMoveBudgetPolicy<'a> {
    pub clock: &'a MoveTimeClock,
}

impl BudgetPolicy for PerMoveBudgetPolicy<'_> {
    fn compute_budget(&self) -> SearchBudget {
        let budget = self.clock.time_on_clock().saturating_sub(SAFETY_MARGIN);
        SearchBudget { target: budget, maximum: budget }
    }
}

/// Base time plus increment: assume roughly 35 moves remain in the
/// game, plus whatever increment this move earns back.
pub struct IncrementalBudgetPolicy<'a> {
    pub clock: &'a IncrementalClock,
}

const ASSUMED_MOVES_REMAINING: u32 = 35;

impl BudgetPolicy for IncrementalBudgetPolicy<'_> {
    fn compute_budget(&self) -> SearchBudget {
        let time_on_clock = self.clock.time_on_clock();
        let increment = self.clock.increment();
        let target = time_on_clock / ASSUMED_MOVES_REMAINING + increment;
        let safety_capped = time_on_clock.saturating_sub(SAFETY_MARGIN);
        let maximum = (target * 3).min(safety_capped);
        SearchBudget { target, maximum }
    }
}

/// Conventional moves-per-block control: divide the time to the next
/// control (and, conservatively, the time to the control after that)
/// evenly across the moves remaining before each.
pub struct ConventionalBudgetPolicy<'a> {
    pub clock: &'a MovesPerPeriodClock,
}

impl BudgetPolicy for ConventionalBudgetPolicy<'_> {
    fn compute_budget(&self) -> SearchBudget {
        let time_on_clock = self.clock.time_on_clock();
        let moves_left = self.clock.moves_until_next_control().max(1);
        let moves_per_block = self.clock.moves_per_block();
        let block_time = self.clock.block_time();

        let time_to_next_control = time_on_clock;
        let time_to_second_control = time_on_clock + block_time;

        let first_estimate = time_to_next_control / (moves_left + 1);
        let second_estimate = time_to_second_control / (moves_left + moves_per_block + 1);
        let target = first_estimate.min(second_estimate);

        let half_clock = time_on_clock / 2;
        let safety_capped = time_on_clock.saturating_sub(SAFETY_MARGIN);
        let maximum = (target * 3).min(half_clock).min(safety_capped);

        SearchBudget { target, maximum }
    }
}

const MIN_CHECK_INTERVAL: Duration = Duration::from_millis(10);
const MAX_CHECK_INTERVAL: Duration = Duration::from_secs(2);
/// Node-check interval used before the search has any nodes-per-second
/// sample to derive one from.
const DEFAULT_CHECK_NODES: u64 = 2048;

/// The stateful Time Manager owned by one search: observes the
/// target/maximum budget and the search's own iteration history to
/// decide whether the search may continue, whether another iteration
/// is worth starting, and how many nodes to search before checking
/// back in.
#[derive(Clone, Copy, Debug)]
pub struct TimeManager {
    target_time: Duration,
    maximum_time: Duration,
    last_two_iterations: [Option<Duration>; 2],
}

impl TimeManager {
    #[must_use]
    pub fn new(budget: SearchBudget) -> Self {
        TimeManager { target_time: budget.target, maximum_time: budget.maximum, last_two_iterations: [None, None] }
    }

    #[must_use]
    pub fn unbounded() -> Self {
        TimeManager::new(SearchBudget::unbounded())
    }

    #[must_use]
    pub fn maximum_time(&self) -> Duration {
        self.maximum_time
    }

    /// True while the search has not yet used its maximum time.
    #[must_use]
    pub fn can_continue(&self, elapsed: Duration) -> bool {
        elapsed < self.maximum_time
    }

    /// True if starting another iteration is worth the risk: before two
    /// iterations have completed, always true; afterwards, true as
    /// long as the next iteration's predicted time (extrapolated from
    /// the growth between the last two) is at most twice the time
    /// remaining to `target_time`.
    #[must_use]
    pub fn can_start_new_iteration(&self, elapsed: Duration) -> bool {
        let [Some(before_last), Some(last)] = self.last_two_iterations else {
            return true;
        };
        let growth = if before_last.is_zero() { 1.0 } else { last.as_secs_f64() / before_last.as_secs_f64() };
        let predicted = last.mul_f64(growth.max(1.0));
        let remaining_to_target = self.target_time.saturating_sub(elapsed);
        predicted <= remaining_to_target.saturating_mul(2)
    }

    /// Records the wall-clock time a just-completed iteration took, so
    /// the next `can_start_new_iteration` call can extrapolate from it.
    pub fn record_iteration(&mut self, duration: Duration) {
        self.last_two_iterations = [self.last_two_iterations[1], Some(duration)];
    }

    /// How many more nodes the search may process before it must poll
    /// `can_continue` again: derived from the nodes-per-second seen so
    /// far, enough to fill half the remaining time to `maximum_time`,
    /// clamped to between 10ms and 2s worth of nodes.
    #[must_use]
    pub fn nodes_before_next_check(&self, nodes_searched: u64, elapsed: Duration) -> u64 {
        let elapsed_secs = elapsed.as_secs_f64();
        if elapsed_secs <= 0.0 || nodes_searched == 0 {
            return DEFAULT_CHECK_NODES;
        }
        let nodes_per_second = nodes_searched as f64 / elapsed_secs;
        let remaining_to_maximum = self.maximum_time.saturating_sub(elapsed);
        let interval = (remaining_to_maximum / 2).clamp(MIN_CHECK_INTERVAL, MAX_CHECK_INTERVAL);
        ((nodes_per_second * interval.as_secs_f64()).round() as u64).max(1)
    }
}
