//! Zobrist hash keys for incremental position hashing.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::piece::{Color, Piece};
use crate::square::Square;

/// Fixed seed so hash keys (and therefore transposition table behavior)
/// are reproducible across runs.
const ZOBRIST_SEED: u64 = 0x5357_4252_544F_5244;

struct ZobristKeys {
    pieces: [[[u64; 64]; 6]; 2],
    side_to_move: u64,
    castling: [u64; 4],
    en_passant_file: [u64; 8],
}

impl ZobristKeys {
    fn generate() -> Self {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        let mut pieces = [[[0u64; 64]; 6]; 2];
        for color in &mut pieces {
            for piece in color.iter_mut() {
                for square in piece.iter_mut() {
                    *square = rng.gen();
                }
            }
        }
        let side_to_move = rng.gen();
        let mut castling = [0u64; 4];
        for key in &mut castling {
            *key = rng.gen();
        }
        let mut en_passant_file = [0u64; 8];
        for key in &mut en_passant_file {
            *key = rng.gen();
        }
        ZobristKeys { pieces, side_to_move, castling, en_passant_file }
    }
}

static KEYS: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::generate);

#[inline]
#[must_use]
pub fn piece_key(color: Color, piece: Piece, square: Square) -> u64 {
    KEYS.pieces[color.array_index()][piece.array_index()][square.index()]
}

#[inline]
#[must_use]
pub fn side_to_move_key() -> u64 {
    KEYS.side_to_move
}

/// `bit` is 0..4, matching the order white-kingside, white-queenside,
/// black-kingside, black-queenside.
#[inline]
#[must_use]
pub fn castling_key(bit: usize) -> u64 {
    KEYS.castling[bit]
}

#[inline]
#[must_use]
pub fn en_passant_key(file: usize) -> u64 {
    KEYS.en_passant_file[file]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_across_calls() {
        let a = piece_key(Color::White, Piece::Pawn, Square::new(1, 0));
        let b = piece_key(Color::White, Piece::Pawn, Square::new(1, 0));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_squares_get_distinct_keys() {
        let a = piece_key(Color::White, Piece::Pawn, Square::new(1, 0));
        let b = piece_key(Color::White, Piece::Pawn, Square::new(1, 1));
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_pieces_get_distinct_keys() {
        let a = piece_key(Color::White, Piece::Pawn, Square::new(1, 0));
        let b = piece_key(Color::White, Piece::Knight, Square::new(1, 0));
        assert_ne!(a, b);
    }

    #[test]
    fn castling_and_en_passant_keys_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for bit in 0..4 {
            assert!(seen.insert(castling_key(bit)));
        }
        for file in 0..8 {
            assert!(seen.insert(en_passant_key(file)));
        }
    }
}
