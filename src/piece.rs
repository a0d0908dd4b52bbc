//! Piece kind, color, and the packed 4-bit piece tag used in the board
//! mailbox and move encoding.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A piece kind, independent of color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Piece {
    Pawn,
    Knight,
    King,
    Queen,
    Bishop,
    Rook,
}

impl Piece {
    /// Index into the per-color bitboard array (0..6), unrelated to the
    /// packed tag's bit pattern.
    #[inline]
    #[must_use]
    pub(crate) const fn array_index(self) -> usize {
        match self {
            Piece::Pawn => 0,
            Piece::Knight => 1,
            Piece::King => 2,
            Piece::Queen => 3,
            Piece::Bishop => 4,
            Piece::Rook => 5,
        }
    }

    /// The low 3 bits of the packed piece tag: Pawn=1, Knight=2, King=3,
    /// Queen=4, Bishop=5, Rook=6.
    #[inline]
    #[must_use]
    pub const fn kind_bits(self) -> u8 {
        match self {
            Piece::Pawn => 1,
            Piece::Knight => 2,
            Piece::King => 3,
            Piece::Queen => 4,
            Piece::Bishop => 5,
            Piece::Rook => 6,
        }
    }

    #[must_use]
    pub const fn from_kind_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Piece::Pawn),
            2 => Some(Piece::Knight),
            3 => Some(Piece::King),
            4 => Some(Piece::Queen),
            5 => Some(Piece::Bishop),
            6 => Some(Piece::Rook),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Option<Piece> {
        match c.to_ascii_lowercase() {
            'p' => Some(Piece::Pawn),
            'n' => Some(Piece::Knight),
            'k' => Some(Piece::King),
            'q' => Some(Piece::Queen),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::King => 'k',
            Piece::Queen => 'q',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
        }
    }

    #[must_use]
    pub fn to_fen_char(self, color: Color) -> char {
        let c = self.to_char();
        if color == Color::White {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }

    /// Standard centipawn material value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Piece::Pawn => 100,
            Piece::Knight => 320,
            Piece::Bishop => 330,
            Piece::Rook => 500,
            Piece::Queen => 900,
            Piece::King => 20000,
        }
    }
}

pub(crate) const PROMOTION_PIECES: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

/// Chess color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    #[must_use]
    pub const fn array_index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// The 4-bit packed piece tag: low 3 bits are the piece kind, bit 3 is
/// color (0=white, 1=black). `NoPiece` is the all-zero value.
///
/// This is the representation stored in the board's mailbox array and
/// in a `Move`'s moving/captured piece fields.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PackedPiece(u8);

impl PackedPiece {
    pub const NONE: PackedPiece = PackedPiece(0);

    #[inline]
    #[must_use]
    pub const fn new(color: Color, piece: Piece) -> Self {
        let color_bit = match color {
            Color::White => 0,
            Color::Black => 1 << 3,
        };
        PackedPiece(piece.kind_bits() | color_bit)
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        PackedPiece(value & 0x0F)
    }

    #[must_use]
    pub const fn unpack(self) -> Option<(Color, Piece)> {
        if self.0 == 0 {
            return None;
        }
        let kind = match Piece::from_kind_bits(self.0 & 0x07) {
            Some(p) => p,
            None => return None,
        };
        let color = if self.0 & 0x08 != 0 { Color::Black } else { Color::White };
        Some((color, kind))
    }
}
