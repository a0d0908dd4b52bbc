//! Search tests verifying the engine finds correct moves in known positions.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use chess_engine::board::{generate_legal_moves, Board};
use chess_engine::moves::GenMode;
use chess_engine::search::{search, SearchLimits};
use chess_engine::time::TimeManager;
use chess_engine::tt::TranspositionTable;

fn best_move_uci(fen: &str, depth: u32) -> String {
    let board = Board::from_xfen(fen, false).expect("valid FEN");
    let mut tt = TranspositionTable::with_size_mb(4);
    let stop = AtomicBool::new(false);
    let limits = SearchLimits { max_depth: Some(depth), max_nodes: None };
    let (best, _stats) = search(&board, &mut tt, limits, TimeManager::unbounded(), &stop);
    best.expect("search should find a move").to_uci(None)
}

#[test]
fn finds_mate_in_one_back_rank() {
    // White to move, Qe8# is mate.
    let uci = best_move_uci("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1", 3);
    assert_eq!(uci, "e1e8");
}

#[test]
fn finds_mate_in_one_queen_capture() {
    // White to move, Qxf7# is scholar's-mate-style.
    let uci = best_move_uci("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 0 4", 3);
    assert_eq!(uci, "h5f7");
}

#[test]
fn captures_free_piece() {
    // White to move, free bishop on c6.
    let uci = best_move_uci("rnbqk1nr/pppp1ppp/2b5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 4", 3);
    let mv_is_capture = uci == "c4c6" || uci == "c4f7";
    assert!(mv_is_capture, "expected a capture of the hanging bishop, got {uci}");
}

#[test]
fn single_legal_move_is_found() {
    // White king on a1 boxed in by a rook, can only escape to a2.
    let uci = best_move_uci("8/8/8/8/8/8/8/K6rk w - - 0 1", 3);
    assert_eq!(uci, "a1a2");
}

#[test]
fn no_move_in_checkmate() {
    let board = Board::from_xfen("rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 1", false)
        .expect("valid FEN");
    let legal = generate_legal_moves(&board, GenMode::All);
    assert!(legal.is_empty(), "position should have no legal moves (checkmate)");
    assert!(board.side_to_move_in_check());
}

#[test]
fn identifies_stalemate() {
    // Black to move, king boxed in with no legal moves and not in check.
    let board = Board::from_xfen("k7/8/1QK5/8/8/8/8/8 b - - 0 1", false).expect("valid FEN");
    let legal = generate_legal_moves(&board, GenMode::All);
    assert!(legal.is_empty());
    assert!(!board.side_to_move_in_check());
}

#[test]
fn evaluation_is_roughly_symmetric_at_the_start() {
    let board = Board::starting_position();
    let eval = board.evaluate();
    assert!(eval.abs() < 50, "starting position should be roughly equal, got {eval}");
}

#[test]
fn evaluation_reflects_material_advantage() {
    let white_up = Board::from_xfen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", false).unwrap();
    let black_up = Board::from_xfen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1", false).unwrap();
    assert!(white_up.evaluate() > 800, "white up a queen should evaluate well above zero");
    assert!(black_up.evaluate() < -800, "black up a queen should evaluate well below zero");
}

#[test]
fn search_completes_within_a_time_budget_at_moderate_depth() {
    let board = Board::starting_position();
    let mut tt = TranspositionTable::with_size_mb(4);
    let stop = AtomicBool::new(false);
    let limits = SearchLimits { max_depth: Some(6), max_nodes: None };
    let budget = chess_engine::time::SearchBudget { target: Duration::from_secs(30), maximum: Duration::from_secs(30) };

    let start = std::time::Instant::now();
    let (best, _stats) = search(&board, &mut tt, limits, TimeManager::new(budget), &stop);
    assert!(best.is_some());
    assert!(start.elapsed() < Duration::from_secs(30));
}
