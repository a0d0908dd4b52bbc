//! Move application and its exact inverse.

use super::Board;
use crate::castling::{CastleKind, CastlingRights};
use crate::moves::Move;
use crate::piece::{Color, PackedPiece, Piece};
use crate::square::Square;
use crate::zobrist;

/// Everything `unmake_move` needs to restore a position after
/// `make_move`, beyond what the move itself encodes.
#[derive(Clone, Copy, Debug)]
pub struct UnmakeInfo {
    captured: PackedPiece,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u16,
    hash: u64,
}

impl Board {
    /// Applies `mv`, which must be pseudo-legal for this position.
    /// Returns the information needed to undo it.
    pub fn make_move(&mut self, mv: Move) -> UnmakeInfo {
        let info = UnmakeInfo {
            captured: mv.captured(),
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        };

        let (color, piece) = mv.piece().unpack().expect("move must carry a real moving piece");
        let from = mv.from();
        let to = mv.to();

        self.clear_hash_side_castling_ep();

        let prior_en_passant = self.en_passant;
        self.en_passant = None;

        if mv.is_castle() {
            self.apply_castle(color, mv);
        } else {
            self.clear_piece(from);
            if let Some(captured_sq) = capture_square(mv, prior_en_passant) {
                self.clear_piece(captured_sq);
            }
            let placed = mv.promotion().map_or(piece, |p| p);
            self.set_piece(to, PackedPiece::new(color, placed));

            if piece == Piece::Pawn && from.rank().abs_diff(to.rank()) == 2 {
                let ep_rank = (from.rank() + to.rank()) / 2;
                self.en_passant = Some(Square::new(ep_rank, from.file()));
            }
        }

        self.update_castling_rights_after_move(color, piece, from, to, mv.captured());

        self.halfmove_clock = if piece == Piece::Pawn || mv.is_capture() {
            0
        } else {
            self.halfmove_clock + 1
        };

        if color == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = color.opponent();

        self.rehash_side_castling_ep();

        info
    }

    /// Undoes `mv`, which must be the move most recently applied via
    /// `make_move` on this position.
    pub fn unmake_move(&mut self, mv: Move, info: UnmakeInfo) {
        let mover = self.side_to_move.opponent();
        self.side_to_move = mover;
        if mover == Color::Black {
            self.fullmove_number -= 1;
        }

        let from = mv.from();
        let to = mv.to();

        if mv.is_castle() {
            self.unapply_castle(mover, mv);
        } else {
            let (_, moved_piece) = self.clear_piece(to).unpack().expect("destination held the moved piece");
            let original_piece = if mv.promotion().is_some() { Piece::Pawn } else { moved_piece };
            self.set_piece(from, PackedPiece::new(mover, original_piece));

            if let Some(captured_sq) = capture_square(mv, info.en_passant) {
                if !info.captured.is_none() {
                    self.set_piece(captured_sq, info.captured);
                }
            }
        }

        self.castling = info.castling;
        self.en_passant = info.en_passant;
        self.halfmove_clock = info.halfmove_clock;
        self.hash = info.hash;
    }

    fn apply_castle(&mut self, color: Color, mv: Move) {
        let king_from = mv.from();
        let rook_file = match mv.castle() {
            CastleKind::Kingside => self.castling.kingside_rook_file(),
            CastleKind::Queenside => self.castling.queenside_rook_file(),
            CastleKind::None => unreachable!("apply_castle called on a non-castling move"),
        };
        let rook_from = Square::new(king_from.rank(), rook_file as usize);
        let (king_to_file, rook_to_file) = match mv.castle() {
            CastleKind::Kingside => (6, 5),
            CastleKind::Queenside => (2, 3),
            CastleKind::None => unreachable!(),
        };

        self.clear_piece(king_from);
        if rook_from != king_from {
            self.clear_piece(rook_from);
        }
        self.set_piece(Square::new(king_from.rank(), king_to_file), PackedPiece::new(color, Piece::King));
        self.set_piece(Square::new(king_from.rank(), rook_to_file), PackedPiece::new(color, Piece::Rook));
    }

    fn unapply_castle(&mut self, color: Color, mv: Move) {
        let king_from = mv.from();
        let rook_file = match mv.castle() {
            CastleKind::Kingside => self.castling.kingside_rook_file(),
            CastleKind::Queenside => self.castling.queenside_rook_file(),
            CastleKind::None => unreachable!("unapply_castle called on a non-castling move"),
        };
        let rook_from = Square::new(king_from.rank(), rook_file as usize);
        let (king_to_file, rook_to_file) = match mv.castle() {
            CastleKind::Kingside => (6, 5),
            CastleKind::Queenside => (2, 3),
            CastleKind::None => unreachable!(),
        };

        self.clear_piece(Square::new(king_from.rank(), king_to_file));
        self.clear_piece(Square::new(king_from.rank(), rook_to_file));
        self.set_piece(king_from, PackedPiece::new(color, Piece::King));
        if rook_from != king_from {
            self.set_piece(rook_from, PackedPiece::new(color, Piece::Rook));
        }
    }

    fn update_castling_rights_after_move(
        &mut self,
        color: Color,
        piece: Piece,
        from: Square,
        to: Square,
        captured: PackedPiece,
    ) {
        if piece == Piece::King {
            self.castling.revoke_all(color);
        }
        if piece == Piece::Rook {
            let home_rank = match color {
                Color::White => 0,
                Color::Black => 7,
            };
            if from.rank() == home_rank {
                self.castling.revoke_for_rook_file(color, from.file());
            }
        }
        if let Some((captured_color, Piece::Rook)) = captured.unpack() {
            let home_rank = match captured_color {
                Color::White => 0,
                Color::Black => 7,
            };
            if to.rank() == home_rank {
                self.castling.revoke_for_rook_file(captured_color, to.file());
            }
        }
    }

    fn clear_hash_side_castling_ep(&mut self) {
        if self.side_to_move == Color::Black {
            self.hash ^= zobrist::side_to_move_key();
        }
        self.unhash_castling_and_ep();
    }

    fn rehash_side_castling_ep(&mut self) {
        if self.side_to_move == Color::Black {
            self.hash ^= zobrist::side_to_move_key();
        }
        self.unhash_castling_and_ep();
    }

    fn unhash_castling_and_ep(&mut self) {
        let rights = self.castling;
        if rights.can_castle_kingside(Color::White) {
            self.hash ^= zobrist::castling_key(0);
        }
        if rights.can_castle_queenside(Color::White) {
            self.hash ^= zobrist::castling_key(1);
        }
        if rights.can_castle_kingside(Color::Black) {
            self.hash ^= zobrist::castling_key(2);
        }
        if rights.can_castle_queenside(Color::Black) {
            self.hash ^= zobrist::castling_key(3);
        }
        if let Some(ep) = self.en_passant {
            self.hash ^= zobrist::en_passant_key(ep.file());
        }
    }
}

fn capture_square(mv: Move, en_passant_before_move: Option<Square>) -> Option<Square> {
    if !mv.is_capture() {
        return None;
    }
    let (_, moving_piece) = mv.piece().unpack()?;
    if moving_piece == Piece::Pawn && mv.to().file() != mv.from().file() && en_passant_before_move == Some(mv.to()) {
        return Some(Square::new(mv.from().rank(), mv.to().file()));
    }
    Some(mv.to())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color;

    #[test]
    fn make_unmake_quiet_move_restores_position() {
        let mut board = Board::starting_position();
        let before = board.clone();
        let mv = Move::new(
            Square::new(1, 4),
            Square::new(3, 4),
            PackedPiece::new(Color::White, Piece::Pawn),
            PackedPiece::NONE,
            None,
        );
        let info = board.make_move(mv);
        assert_ne!(board, before);
        board.unmake_move(mv, info);
        assert_eq!(board, before);
    }

    #[test]
    fn make_unmake_capture_restores_position() {
        let mut board =
            crate::board::fen::parse_xfen("4k3/8/8/8/3p4/4P3/8/4K3 w - - 0 1", false).unwrap();
        let before = board.clone();
        let mv = Move::new(
            Square::new(2, 4),
            Square::new(3, 3),
            PackedPiece::new(Color::White, Piece::Pawn),
            PackedPiece::new(Color::Black, Piece::Pawn),
            None,
        );
        let info = board.make_move(mv);
        board.unmake_move(mv, info);
        assert_eq!(board, before);
    }

    #[test]
    fn make_unmake_en_passant_restores_position() {
        let mut board = crate::board::fen::parse_xfen(
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
            false,
        )
        .unwrap();
        let before = board.clone();
        let mv = Move::new(
            Square::new(4, 4),
            Square::new(5, 3),
            PackedPiece::new(Color::White, Piece::Pawn),
            PackedPiece::new(Color::Black, Piece::Pawn),
            None,
        );
        let info = board.make_move(mv);
        assert!(board.piece_at(Square::new(4, 3)).is_none());
        board.unmake_move(mv, info);
        assert_eq!(board, before);
    }

    #[test]
    fn capturing_an_off_file_rook_does_not_revoke_unrelated_castling_rights() {
        // White still has an untouched home-square rook on h1 (kingside
        // rights intact); a second white rook sits off its home rank on
        // h4, sharing a file with the castling rook. Capturing it must
        // not revoke white's kingside castling right.
        let mut board = crate::board::fen::parse_xfen("4k3/8/8/7r/7R/8/8/4K2R b K - 0 1", false).unwrap();
        assert!(board.castling_rights().can_castle_kingside(Color::White));
        let mv = Move::new(
            Square::new(4, 7),
            Square::new(3, 7),
            PackedPiece::new(Color::Black, Piece::Rook),
            PackedPiece::new(Color::White, Piece::Rook),
            None,
        );
        board.make_move(mv);
        assert!(board.castling_rights().can_castle_kingside(Color::White));
    }
}
