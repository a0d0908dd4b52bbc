//! The engine control state machine: `Observing` / `Waiting` /
//! `Searching` / `Perft`, dispatching external commands to the handler
//! valid for the current state.

pub mod perft;

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::board::Board;
use crate::config::EngineConfig;
use crate::error::{EngineError, IllegalMoveError, InvalidEngineCommandError, UnsupportedTimeControlError};
use crate::moves::Move;
use crate::piece::Color;
use crate::search::{self, SearchLimits, SearchStats};
use crate::time::{
    BudgetPolicy, ChessClock, ConventionalBudgetPolicy, GoRequest, IncrementalBudgetPolicy, IncrementalClock,
    MoveTimeClock, MovesPerPeriodClock, PerMoveBudgetPolicy, SearchBudget, TimeControl, TimeManager,
};
use crate::tt::TranspositionTable;

/// One of the named external commands a shell/UCI adapter translates
/// its input into.
#[derive(Debug)]
pub enum Command {
    SetFen(String),
    UserMove(String),
    Go(GoRequest),
    Force,
    Stop,
    New,
    Perft(u32),
    SetTimeControl(TimeControl),
    SetMoveTime(Duration),
    SetDepth(u32),
    SetOption(String, String),
}

/// What happened as a result of dispatching a [`Command`].
#[derive(Debug)]
pub enum CommandOutcome {
    Ok,
    /// A move was played. `stats` is `Some` when the move is the
    /// engine's own, just produced by a completed search; `None` when
    /// it is merely echoing a user-supplied move not yet searched.
    MoveMade { notation: String, stats: Option<SearchStats> },
    SearchStarted,
    SearchStopped,
    PerftStarted,
    PerftResult(u64),
}

struct SearchHandoff {
    stop_flag: Arc<AtomicBool>,
    handle: JoinHandle<()>,
    receiver: Receiver<(Option<Move>, SearchStats, TranspositionTable)>,
    /// The side whose clock was started for this search, so it can be
    /// stopped (and replenished) when the search ends.
    thinking_color: Color,
}

struct PerftHandoff {
    handle: JoinHandle<()>,
    receiver: Receiver<u64>,
}

/// The four engine states. Data owned only while in that state (the
/// in-flight search handle, the perft job) lives inside the variant.
enum EngineState {
    Observing,
    Waiting,
    Searching(SearchHandoff),
    Perft(PerftHandoff),
}

/// Engine context: board, clock, time control, transposition table,
/// and the current state. Owns everything a search or perft job needs
/// to be handed off to a worker thread.
pub struct Engine {
    board: Board,
    state: EngineState,
    tt: Option<TranspositionTable>,
    time_control: TimeControl,
    clock: ClockState,
    max_depth: Option<u32>,
    config: EngineConfig,
}

/// Both sides' clocks for whichever time-control variant is active.
/// Indexed by [`Color::array_index`].
enum ClockState {
    PerMove([MoveTimeClock; 2]),
    Incremental([IncrementalClock; 2]),
    Conventional([MovesPerPeriodClock; 2]),
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let default_move_time = MoveTimeClock::new(Duration::from_secs(5));
        Engine {
            board: Board::starting_position(),
            state: EngineState::Observing,
            tt: Some(TranspositionTable::with_size_mb(config.hash_mb)),
            time_control: TimeControl::PerMove,
            clock: ClockState::PerMove([default_move_time, default_move_time]),
            max_depth: None,
            config,
        }
    }

    /// Starts the named side's clock. Must be called only while that
    /// side's clock is stopped.
    fn start_clock(&mut self, color: Color) {
        let idx = color.array_index();
        match &mut self.clock {
            ClockState::PerMove(clocks) => clocks[idx].start(),
            ClockState::Incremental(clocks) => clocks[idx].start(),
            ClockState::Conventional(clocks) => clocks[idx].start(),
        }
    }

    /// Stops the named side's clock, applying that variant's
    /// replenishment rule. Must be called only while that side's clock
    /// is running.
    fn stop_clock(&mut self, color: Color) {
        let idx = color.array_index();
        match &mut self.clock {
            ClockState::PerMove(clocks) => clocks[idx].stop(),
            ClockState::Incremental(clocks) => clocks[idx].stop(),
            ClockState::Conventional(clocks) => clocks[idx].stop(),
        }
    }

    /// The time budget for `color`'s next search, from its clock's
    /// current (stopped) reading.
    fn compute_budget(&self, color: Color) -> SearchBudget {
        let idx = color.array_index();
        match &self.clock {
            ClockState::PerMove(clocks) => PerMoveBudgetPolicy { clock: &clocks[idx] }.compute_budget(),
            ClockState::Incremental(clocks) => IncrementalBudgetPolicy { clock: &clocks[idx] }.compute_budget(),
            ClockState::Conventional(clocks) => ConventionalBudgetPolicy { clock: &clocks[idx] }.compute_budget(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn state_name(&self) -> &'static str {
        match self.state {
            EngineState::Observing => "observing",
            EngineState::Waiting => "waiting",
            EngineState::Searching(_) => "searching",
            EngineState::Perft(_) => "perft",
        }
    }

    /// Polls an in-flight search or perft job for completion, advancing
    /// the state machine if it has finished. Must be called
    /// periodically by the protocol adapter's read loop.
    pub fn poll(&mut self) -> Option<CommandOutcome> {
        match &mut self.state {
            EngineState::Searching(handoff) => match handoff.receiver.try_recv() {
                Ok((best_move, stats, tt)) => {
                    self.tt = Some(tt);
                    let thinking_color = handoff.thinking_color;
                    let board_before = self.board.clone();
                    if let Some(mv) = best_move {
                        self.board.make_move(mv);
                    }
                    self.state = EngineState::Waiting;
                    self.stop_clock(thinking_color);
                    let notation = self.format_move(&board_before, best_move.unwrap_or(Move::NULL));
                    #[cfg(feature = "logging")]
                    log::debug!(
                        "search finished: move={notation} depth={} nodes={} time={:?}",
                        stats.depth,
                        stats.nodes,
                        stats.time
                    );
                    Some(CommandOutcome::MoveMade { notation, stats: Some(stats) })
                }
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    let thinking_color = handoff.thinking_color;
                    self.state = EngineState::Waiting;
                    self.stop_clock(thinking_color);
                    None
                }
            },
            EngineState::Perft(handoff) => match handoff.receiver.try_recv() {
                Ok(nodes) => {
                    self.state = EngineState::Observing;
                    Some(CommandOutcome::PerftResult(nodes))
                }
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    self.state = EngineState::Observing;
                    None
                }
            },
            _ => None,
        }
    }

    /// Dispatches `command` to the handler valid for the current
    /// state, per the engine's command-by-state table.
    pub fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, EngineError> {
        match (&self.state, command) {
            (EngineState::Observing, Command::SetFen(fen)) => {
                self.board = Board::from_xfen(&fen, self.config.uci_chess960)?;
                Ok(CommandOutcome::Ok)
            }
            (EngineState::Observing, Command::UserMove(notation)) => {
                self.apply_user_move(&notation)?;
                Ok(CommandOutcome::Ok)
            }
            (EngineState::Waiting, Command::UserMove(notation)) => {
                let board_before = self.board.clone();
                let mv = self.apply_user_move(&notation)?;
                self.start_search()?;
                Ok(CommandOutcome::MoveMade { notation: self.format_move(&board_before, mv), stats: None })
            }
            (EngineState::Observing, Command::Go(req)) | (EngineState::Waiting, Command::Go(req)) => {
                self.apply_go_request(&req)?;
                self.start_search()?;
                Ok(CommandOutcome::SearchStarted)
            }
            (EngineState::Waiting, Command::Force) => {
                self.state = EngineState::Observing;
                Ok(CommandOutcome::Ok)
            }
            (EngineState::Searching(_), Command::Force) => {
                self.stop_search_blocking();
                self.state = EngineState::Observing;
                Ok(CommandOutcome::Ok)
            }
            (EngineState::Searching(_), Command::Stop) => {
                self.stop_search_blocking();
                self.state = EngineState::Waiting;
                Ok(CommandOutcome::SearchStopped)
            }
            (EngineState::Perft(_), Command::Stop) => {
                self.state = EngineState::Observing;
                Ok(CommandOutcome::SearchStopped)
            }
            (EngineState::Observing, Command::New) | (EngineState::Waiting, Command::New) => {
                self.board = Board::starting_position();
                if let Some(tt) = &mut self.tt {
                    tt.clear();
                }
                self.state = EngineState::Waiting;
                Ok(CommandOutcome::Ok)
            }
            (EngineState::Observing, Command::Perft(depth)) => {
                self.start_perft(depth);
                Ok(CommandOutcome::PerftStarted)
            }
            (EngineState::Observing, Command::SetTimeControl(tc)) | (EngineState::Waiting, Command::SetTimeControl(tc)) => {
                self.time_control = tc;
                Ok(CommandOutcome::Ok)
            }
            (EngineState::Observing, Command::SetMoveTime(d)) | (EngineState::Waiting, Command::SetMoveTime(d)) => {
                self.time_control = TimeControl::PerMove;
                self.clock = ClockState::PerMove([MoveTimeClock::new(d), MoveTimeClock::new(d)]);
                Ok(CommandOutcome::Ok)
            }
            (EngineState::Observing, Command::SetDepth(d)) | (EngineState::Waiting, Command::SetDepth(d)) => {
                self.max_depth = Some(d);
                Ok(CommandOutcome::Ok)
            }
            (EngineState::Observing, Command::SetOption(name, value)) | (EngineState::Waiting, Command::SetOption(name, value)) => {
                let was_hash_mb = self.config.hash_mb;
                self.config.apply_option(&name, &value);
                if self.config.hash_mb != was_hash_mb {
                    self.tt = Some(TranspositionTable::with_size_mb(self.config.hash_mb));
                }
                Ok(CommandOutcome::Ok)
            }
            (_, command) => {
                #[cfg(feature = "logging")]
                log::warn!("rejected {command:?} while in state {}", self.state_name());
                Err(InvalidEngineCommandError { command: format!("{command:?}") }.into())
            }
        }
    }

    fn apply_user_move(&mut self, notation: &str) -> Result<Move, EngineError> {
        let legal = crate::board::generate_legal_moves(&self.board, crate::moves::GenMode::All);
        let mv = legal
            .iter()
            .find(|m| self.matches_move_notation(**m, notation))
            .copied()
            .ok_or_else(|| IllegalMoveError { notation: notation.to_string() })?;
        self.board.make_move(mv);
        Ok(mv)
    }

    /// Matches `notation` against `mv` in whichever dialect applies:
    /// standard coordinate notation, Chess960 king-takes-own-rook
    /// notation when `uci_chess960` is set, or SAN.
    fn matches_move_notation(&self, mv: Move, notation: &str) -> bool {
        if mv.to_uci(None) == notation || self.board.to_san(mv) == notation {
            return true;
        }
        if self.config.uci_chess960 && mv.is_castle() {
            let rights = self.board.castling_rights();
            let rook_file = match mv.castle() {
                crate::castling::CastleKind::Kingside => rights.kingside_rook_file(),
                crate::castling::CastleKind::Queenside => rights.queenside_rook_file(),
                crate::castling::CastleKind::None => return false,
            };
            let rank = mv.from().rank();
            let rook_square = crate::square::Square::new(rank, rook_file as usize);
            return mv.to_uci(Some(rook_square)) == notation;
        }
        false
    }

    /// Renders `mv`, played from `board_before`, in whichever dialect
    /// the current options select: SAN, Chess960 king-takes-own-rook
    /// coordinate notation, or plain coordinate notation.
    fn format_move(&self, board_before: &Board, mv: Move) -> String {
        if mv.is_null() {
            return "0000".to_string();
        }
        if self.config.use_san {
            return board_before.to_san(mv);
        }
        if self.config.uci_chess960 && mv.is_castle() {
            let rights = board_before.castling_rights();
            let rook_file = match mv.castle() {
                crate::castling::CastleKind::Kingside => rights.kingside_rook_file(),
                crate::castling::CastleKind::Queenside => rights.queenside_rook_file(),
                crate::castling::CastleKind::None => return mv.to_uci(None),
            };
            let rook_square = crate::square::Square::new(mv.from().rank(), rook_file as usize);
            return mv.to_uci(Some(rook_square));
        }
        mv.to_uci(None)
    }

    fn apply_go_request(&mut self, req: &GoRequest) -> Result<(), EngineError> {
        if let Some(wtime) = req.white_time {
            let btime = req.black_time.unwrap_or(wtime);
            match self.time_control {
                TimeControl::Incremental => {
                    let winc = req.white_increment.unwrap_or_default();
                    let binc = req.black_increment.unwrap_or(winc);
                    self.clock =
                        ClockState::Incremental([IncrementalClock::new(wtime, winc), IncrementalClock::new(btime, binc)]);
                }
                TimeControl::Conventional { moves_per_block } => {
                    self.clock = ClockState::Conventional([
                        MovesPerPeriodClock::new(wtime, moves_per_block, wtime),
                        MovesPerPeriodClock::new(btime, moves_per_block, btime),
                    ]);
                }
                TimeControl::PerMove => {
                    self.clock = ClockState::PerMove([MoveTimeClock::new(wtime), MoveTimeClock::new(btime)]);
                }
            }
        } else if let Some(move_time) = req.move_time {
            self.clock = ClockState::PerMove([MoveTimeClock::new(move_time), MoveTimeClock::new(move_time)]);
        } else if req.depth.is_none() && !req.infinite {
            return Err(UnsupportedTimeControlError {
                reason: "go command had neither a clock, movetime, nor depth".to_string(),
            }
            .into());
        }
        if let Some(depth) = req.depth {
            self.max_depth = Some(depth);
        }
        Ok(())
    }

    fn start_search(&mut self) -> Result<(), EngineError> {
        let color = self.board.side_to_move();
        let budget = self.compute_budget(color);
        self.start_clock(color);

        let board = self.board.clone();
        let mut tt = self.tt.take().expect("tt is always present outside a search");
        let limits = SearchLimits { max_depth: self.max_depth, max_nodes: None };
        let time_manager = TimeManager::new(budget);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop_flag);
        let (sender, receiver) = std::sync::mpsc::channel();

        let handle = std::thread::Builder::new()
            .stack_size(32 * 1024 * 1024)
            .spawn(move || {
                let (best_move, stats) = search::search(&board, &mut tt, limits, time_manager, &thread_stop);
                let _ = sender.send((best_move, stats, tt));
            })
            .expect("failed to spawn search worker thread");

        #[cfg(feature = "logging")]
        log::debug!("search started: max_depth={:?}", self.max_depth);
        self.state = EngineState::Searching(SearchHandoff { stop_flag, handle, receiver, thinking_color: color });
        Ok(())
    }

    fn stop_search_blocking(&mut self) {
        if let EngineState::Searching(handoff) = &self.state {
            handoff.stop_flag.store(true, AtomicOrdering::Relaxed);
        }
        if let EngineState::Searching(handoff) = std::mem::replace(&mut self.state, EngineState::Waiting) {
            if let Ok((best_move, _stats, tt)) = handoff.receiver.recv() {
                self.tt = Some(tt);
                if let Some(mv) = best_move {
                    self.board.make_move(mv);
                }
            }
            let _ = handoff.handle.join();
            self.stop_clock(handoff.thinking_color);
        }
    }

    fn start_perft(&mut self, depth: u32) {
        let board = self.board.clone();
        let threads = self.config.perft_threads.max(1);
        let (sender, receiver) = std::sync::mpsc::channel();
        let handle = std::thread::Builder::new()
            .stack_size(32 * 1024 * 1024)
            .spawn(move || {
                let nodes = perft::parallel_perft(&board, depth, threads);
                let _ = sender.send(nodes);
            })
            .expect("failed to spawn perft worker thread");
        #[cfg(feature = "logging")]
        log::debug!("perft started: depth={depth} threads={threads}");
        self.state = EngineState::Perft(PerftHandoff { handle, receiver });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_observing_and_reaches_waiting_on_new() {
        let mut engine = Engine::new(EngineConfig::default());
        assert_eq!(engine.state_name(), "observing");
        let outcome = engine.dispatch(Command::New).unwrap();
        assert!(matches!(outcome, CommandOutcome::Ok));
        assert_eq!(engine.state_name(), "waiting");
    }

    #[test]
    fn set_fen_is_rejected_outside_observing() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.dispatch(Command::New).unwrap();
        let result = engine.dispatch(Command::SetFen("8/8/8/8/8/8/8/8 w - - 0 1".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn user_move_from_waiting_starts_a_search() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.dispatch(Command::New).unwrap();
        engine.dispatch(Command::SetTimeControl(TimeControl::PerMove)).unwrap();
        let outcome = engine
            .dispatch(Command::Go(GoRequest { move_time: Some(Duration::from_millis(50)), ..Default::default() }))
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::SearchStarted));
        assert_eq!(engine.state_name(), "searching");
        engine.stop_search_blocking();
        assert_eq!(engine.state_name(), "waiting");
    }

    #[test]
    fn force_from_searching_returns_to_observing() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.dispatch(Command::New).unwrap();
        engine
            .dispatch(Command::Go(GoRequest { move_time: Some(Duration::from_millis(50)), ..Default::default() }))
            .unwrap();
        engine.dispatch(Command::Force).unwrap();
        assert_eq!(engine.state_name(), "observing");
    }

    #[test]
    fn perft_from_observing_is_accepted_and_waiting_is_not() {
        let mut engine = Engine::new(EngineConfig::default());
        let outcome = engine.dispatch(Command::Perft(1));
        assert!(matches!(outcome, Ok(CommandOutcome::PerftStarted)));
        while engine.poll().is_none() {
            std::thread::yield_now();
        }
        assert_eq!(engine.state_name(), "observing");

        engine.dispatch(Command::New).unwrap();
        assert!(engine.dispatch(Command::Perft(1)).is_err());
    }
}
