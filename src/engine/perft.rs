//! Move-count enumeration for the `perft` state.

use crate::board::Board;
use crate::moves::GenMode;

/// Counts the leaf nodes reachable from `board` in exactly `depth`
/// plies, by brute-force enumeration (no bulk-counting shortcut at the
/// last ply, so this also validates legality at every node).
#[must_use]
pub fn perft(board: &Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = crate::board::generate_legal_moves(board, GenMode::All);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    let mut board = board.clone();
    for &mv in moves.iter() {
        let info = board.make_move(mv);
        nodes += perft(&board, depth - 1);
        board.unmake_move(mv, info);
    }
    nodes
}

/// Splits the root moves across `threads` worker threads and sums their
/// subtree counts. Falls back to the single-threaded walk for `depth`
/// 0 or 1, or when only one thread is requested.
#[must_use]
pub fn parallel_perft(board: &Board, depth: u32, threads: usize) -> u64 {
    if threads <= 1 || depth <= 1 {
        return perft(board, depth);
    }
    let root_moves = crate::board::generate_legal_moves(board, GenMode::All);
    if root_moves.is_empty() {
        return 0;
    }

    std::thread::scope(|scope| {
        let handles: Vec<_> = root_moves
            .iter()
            .map(|&mv| {
                let mut child = board.clone();
                scope.spawn(move || {
                    let info = child.make_move(mv);
                    let nodes = perft(&child, depth - 1);
                    child.unmake_move(mv, info);
                    nodes
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("perft worker thread panicked")).sum()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_depth_4() {
        let board = Board::starting_position();
        assert_eq!(perft(&board, 4), 197_281);
    }

    #[test]
    fn starting_position_depth_0_is_one() {
        let board = Board::starting_position();
        assert_eq!(perft(&board, 0), 1);
    }
}
