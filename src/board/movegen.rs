//! Pseudo-legal move generation and legality filtering.

use super::{attack_tables, Board};
use crate::bitboard::{pop_lsb, Bitboard};
use crate::castling::CastleKind;
use crate::moves::{GenMode, Move, MoveList};
use crate::piece::{Color, PackedPiece, Piece, PROMOTION_PIECES};
use crate::square::Square;

/// All pseudo-legal moves for the side to move, filtered to those that
/// do not leave that side's own king in check.
#[must_use]
pub fn generate_legal_moves(board: &Board, mode: GenMode) -> MoveList {
    let pseudo = generate_pseudo_legal_moves(board, mode);
    let mut legal = MoveList::new();
    let mover = board.side_to_move();
    for &mv in pseudo.iter() {
        let mut scratch = board.clone();
        scratch.make_move(mv);
        if !scratch.is_in_check(mover) {
            legal.push(mv);
        }
    }
    legal
}

#[must_use]
pub fn generate_pseudo_legal_moves(board: &Board, mode: GenMode) -> MoveList {
    let mut moves = MoveList::new();
    let color = board.side_to_move();
    generate_pawn_moves(board, color, mode, &mut moves);
    generate_leaper_moves(board, color, Piece::Knight, mode, &mut moves);
    generate_slider_moves(board, color, Piece::Bishop, mode, &mut moves);
    generate_slider_moves(board, color, Piece::Rook, mode, &mut moves);
    generate_slider_moves(board, color, Piece::Queen, mode, &mut moves);
    generate_leaper_moves(board, color, Piece::King, mode, &mut moves);
    if mode != GenMode::Captures {
        generate_castling_moves(board, color, &mut moves);
    }
    moves
}

fn own_and_enemy(board: &Board, color: Color) -> (Bitboard, Bitboard) {
    (board.occupancy_for(color), board.occupancy_for(color.opponent()))
}

fn targets_for_mode(mode: GenMode, enemy: Bitboard, empty: Bitboard) -> Bitboard {
    match mode {
        GenMode::Captures => enemy,
        GenMode::Quiets => empty,
        GenMode::All => Bitboard(enemy.0 | empty.0),
    }
}

fn generate_leaper_moves(board: &Board, color: Color, piece: Piece, mode: GenMode, out: &mut MoveList) {
    let (own, enemy) = own_and_enemy(board, color);
    let empty = Bitboard(!(own.0 | enemy.0));
    let mut pieces = board.piece_bb(color, piece);
    while !pieces.is_empty() {
        let from = pop_lsb(&mut pieces);
        let attacks = match piece {
            Piece::Knight => attack_tables::knight_attacks(from),
            Piece::King => attack_tables::king_attacks(from),
            _ => unreachable!("generate_leaper_moves called with a slider piece"),
        };
        let targets = Bitboard(attacks.0 & targets_for_mode(mode, enemy, empty).0 & !own.0);
        emit_moves(board, color, piece, from, targets, out);
    }
}

fn generate_slider_moves(board: &Board, color: Color, piece: Piece, mode: GenMode, out: &mut MoveList) {
    let (own, enemy) = own_and_enemy(board, color);
    let empty = Bitboard(!(own.0 | enemy.0));
    let occ = board.all_occupancy().0;
    let mut pieces = board.piece_bb(color, piece);
    while !pieces.is_empty() {
        let from = pop_lsb(&mut pieces);
        let attacks = match piece {
            Piece::Bishop => attack_tables::bishop_attacks(from, occ),
            Piece::Rook => attack_tables::rook_attacks(from, occ),
            Piece::Queen => attack_tables::queen_attacks(from, occ),
            _ => unreachable!("generate_slider_moves called with a non-slider piece"),
        };
        let targets = Bitboard(attacks.0 & targets_for_mode(mode, enemy, empty).0 & !own.0);
        emit_moves(board, color, piece, from, targets, out);
    }
}

fn emit_moves(board: &Board, color: Color, piece: Piece, from: Square, mut targets: Bitboard, out: &mut MoveList) {
    while !targets.is_empty() {
        let to = pop_lsb(&mut targets);
        let captured = board.piece_at(to);
        out.push(Move::new(from, to, PackedPiece::new(color, piece), captured, None));
    }
}

fn generate_pawn_moves(board: &Board, color: Color, mode: GenMode, out: &mut MoveList) {
    let (own, enemy) = own_and_enemy(board, color);
    let empty = Bitboard(!(own.0 | enemy.0));
    let (forward, start_rank, promo_rank): (i32, usize, usize) = match color {
        Color::White => (8, 1, 7),
        Color::Black => (-8, 6, 0),
    };

    let mut pawns = board.piece_bb(color, Piece::Pawn);
    while !pawns.is_empty() {
        let from = pop_lsb(&mut pawns);

        if mode != GenMode::Captures {
            let one_idx = from.index() as i32 + forward;
            if (0..64).contains(&one_idx) {
                let one = Square::from_index(one_idx as usize);
                if empty.contains(one) {
                    push_pawn_move(color, from, one, promo_rank, out);
                    if from.rank() == start_rank {
                        let two_idx = one_idx + forward;
                        let two = Square::from_index(two_idx as usize);
                        if empty.contains(two) {
                            out.push(Move::new(from, two, PackedPiece::new(color, Piece::Pawn), PackedPiece::NONE, None));
                        }
                    }
                }
            }
        }

        if mode != GenMode::Quiets {
            let attacks = attack_tables::pawn_attacks(color, from);
            let mut captures = Bitboard(attacks.0 & enemy.0);
            while !captures.is_empty() {
                let to = pop_lsb(&mut captures);
                let captured = board.piece_at(to);
                push_pawn_capture(color, from, to, promo_rank, captured, out);
            }

            if let Some(ep) = board.en_passant_square() {
                if attacks.contains(ep) {
                    let captured_pawn = PackedPiece::new(color.opponent(), Piece::Pawn);
                    out.push(Move::new(from, ep, PackedPiece::new(color, Piece::Pawn), captured_pawn, None));
                }
            }
        }
    }
}

fn push_pawn_move(color: Color, from: Square, to: Square, promo_rank: usize, out: &mut MoveList) {
    if to.rank() == promo_rank {
        for &promo in &PROMOTION_PIECES {
            out.push(Move::new(from, to, PackedPiece::new(color, Piece::Pawn), PackedPiece::NONE, Some(promo)));
        }
    } else {
        out.push(Move::new(from, to, PackedPiece::new(color, Piece::Pawn), PackedPiece::NONE, None));
    }
}

fn push_pawn_capture(
    color: Color,
    from: Square,
    to: Square,
    promo_rank: usize,
    captured: PackedPiece,
    out: &mut MoveList,
) {
    if to.rank() == promo_rank {
        for &promo in &PROMOTION_PIECES {
            out.push(Move::new(from, to, PackedPiece::new(color, Piece::Pawn), captured, Some(promo)));
        }
    } else {
        out.push(Move::new(from, to, PackedPiece::new(color, Piece::Pawn), captured, None));
    }
}

fn generate_castling_moves(board: &Board, color: Color, out: &mut MoveList) {
    if board.is_in_check(color) {
        return;
    }
    let rights = board.castling_rights();
    let rank = match color {
        Color::White => 0,
        Color::Black => 7,
    };
    let king_from = board.king_square(color);

    for (kind, can) in [
        (CastleKind::Kingside, rights.can_castle_kingside(color)),
        (CastleKind::Queenside, rights.can_castle_queenside(color)),
    ] {
        if !can {
            continue;
        }
        let rook_file = match kind {
            CastleKind::Kingside => rights.kingside_rook_file(),
            CastleKind::Queenside => rights.queenside_rook_file(),
            CastleKind::None => unreachable!(),
        } as usize;
        let rook_from = Square::new(rank, rook_file);
        let (king_to_file, rook_to_file) = match kind {
            CastleKind::Kingside => (6, 5),
            CastleKind::Queenside => (2, 3),
            CastleKind::None => unreachable!(),
        };
        let king_to = Square::new(rank, king_to_file);
        let rook_to = Square::new(rank, rook_to_file);

        if !path_is_clear_and_unattacked(board, color, king_from, king_to, rook_from, rook_to) {
            continue;
        }

        out.push(Move::new_castle(king_from, king_to, PackedPiece::new(color, Piece::King), kind));
    }
}

fn path_is_clear_and_unattacked(
    board: &Board,
    color: Color,
    king_from: Square,
    king_to: Square,
    rook_from: Square,
    rook_to: Square,
) -> bool {
    let occ_without_king_and_rook = board.all_occupancy().0 & !king_from.bit() & !rook_from.bit();

    let king_path_min = king_from.file().min(king_to.file());
    let king_path_max = king_from.file().max(king_to.file());
    let rook_path_min = rook_from.file().min(rook_to.file()).min(king_path_min);
    let rook_path_max = rook_from.file().max(rook_to.file()).max(king_path_max);

    for file in rook_path_min..=rook_path_max {
        let sq = Square::new(king_from.rank(), file);
        if sq != king_from && sq != rook_from && (occ_without_king_and_rook & sq.bit()) != 0 {
            return false;
        }
    }

    for file in king_path_min..=king_path_max {
        let sq = Square::new(king_from.rank(), file);
        if board.is_attacked(sq, color.opponent()) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perft(board: &Board, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = generate_legal_moves(board, GenMode::All);
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for &mv in moves.iter() {
            let mut next = board.clone();
            next.make_move(mv);
            nodes += perft(&next, depth - 1);
        }
        nodes
    }

    #[test]
    fn starting_position_move_count() {
        let board = Board::starting_position();
        assert_eq!(generate_legal_moves(&board, GenMode::All).len(), 20);
    }

    #[test]
    fn perft_starting_position_depth_3() {
        let board = Board::starting_position();
        assert_eq!(perft(&board, 3), 8_902);
    }

    #[test]
    fn perft_starting_position_depth_4() {
        let board = Board::starting_position();
        assert_eq!(perft(&board, 4), 197_281);
    }

    #[test]
    fn kiwipete_perft_depth_2() {
        let board = crate::board::fen::parse_xfen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            false,
        )
        .unwrap();
        assert_eq!(perft(&board, 2), 2_039);
    }

    #[test]
    fn castling_move_generated_when_path_clear() {
        let board =
            crate::board::fen::parse_xfen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", false).unwrap();
        let moves = generate_legal_moves(&board, GenMode::All);
        let castles = moves.iter().filter(|m| m.is_castle()).count();
        assert_eq!(castles, 2);
    }

    #[test]
    fn castling_blocked_through_check_is_excluded() {
        let board =
            crate::board::fen::parse_xfen("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1", false).unwrap();
        let moves = generate_legal_moves(&board, GenMode::All);
        assert!(moves.iter().all(|m| !m.is_castle()));
    }

    #[test]
    fn en_passant_capture_is_generated() {
        let board = crate::board::fen::parse_xfen(
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
            false,
        )
        .unwrap();
        let moves = generate_legal_moves(&board, GenMode::All);
        assert!(moves
            .iter()
            .any(|m| m.from() == Square::new(4, 4) && m.to() == Square::new(5, 3)));
    }

    #[test]
    fn pinned_piece_cannot_move_off_the_pin_line() {
        let board =
            crate::board::fen::parse_xfen("4k3/8/8/8/q3R2K/8/8/8 w - - 0 1", false).unwrap();
        let moves = generate_legal_moves(&board, GenMode::All);
        let rook_moves: Vec<_> = moves.iter().filter(|m| m.from() == Square::new(3, 4)).collect();
        assert!(!rook_moves.is_empty());
        assert!(rook_moves.iter().all(|m| m.to().rank() == 3));
    }
}
