//! Standard Algebraic Notation rendering and parsing.

use super::Board;
use crate::castling::CastleKind;
use crate::error::SanError;
use crate::moves::{GenMode, Move};
use crate::piece::Piece;

/// Renders `mv` in SAN, given the position it is played from. Castling
/// is always rendered with the letter notation (`O-O`, `O-O-O`)
/// regardless of whether the underlying position is Chess960.
#[must_use]
pub fn to_san(board: &Board, mv: Move) -> String {
    if mv.is_castle() {
        let base = match mv.castle() {
            CastleKind::Kingside => "O-O",
            CastleKind::Queenside => "O-O-O",
            CastleKind::None => unreachable!(),
        };
        return format!("{base}{}", check_suffix(board, mv));
    }

    let (_, piece) = mv.piece().unpack().expect("move carries a real piece");
    let mut san = String::new();

    if piece == Piece::Pawn {
        if mv.is_capture() {
            san.push(file_char(mv.from().file()));
            san.push('x');
        }
        san.push_str(&mv.to().to_string());
        if let Some(promo) = mv.promotion() {
            san.push('=');
            san.push(promo.to_char().to_ascii_uppercase());
        }
    } else {
        san.push(piece.to_char().to_ascii_uppercase());
        san.push_str(&disambiguation(board, mv, piece));
        if mv.is_capture() {
            san.push('x');
        }
        san.push_str(&mv.to().to_string());
    }

    san.push_str(&check_suffix(board, mv));
    san
}

fn file_char(file: usize) -> char {
    (b'a' + file as u8) as char
}

fn check_suffix(board: &Board, mv: Move) -> String {
    let mut after = board.clone();
    after.make_move(mv);
    if !after.side_to_move_in_check() {
        return String::new();
    }
    let no_replies = super::movegen::generate_legal_moves(&after, GenMode::All).is_empty();
    if no_replies {
        "#".to_string()
    } else {
        "+".to_string()
    }
}

fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let (color, _) = mv.piece().unpack().unwrap();
    let others: Vec<Move> = super::movegen::generate_legal_moves(board, GenMode::All)
        .iter()
        .copied()
        .filter(|&other| {
            other.to() == mv.to()
                && other.from() != mv.from()
                && other.piece().unpack() == Some((color, piece))
        })
        .collect();

    if others.is_empty() {
        return String::new();
    }

    let same_file = others.iter().any(|o| o.from().file() == mv.from().file());
    let same_rank = others.iter().any(|o| o.from().rank() == mv.from().rank());

    if !same_file {
        file_char(mv.from().file()).to_string()
    } else if !same_rank {
        (mv.from().rank() + 1).to_string()
    } else {
        mv.from().to_string()
    }
}

/// Parses a SAN string into the legal move it denotes in `board`.
pub fn from_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let trimmed = san.trim_end_matches(['+', '#']);
    if trimmed.is_empty() {
        return Err(SanError::Empty);
    }

    let legal = super::movegen::generate_legal_moves(board, GenMode::All);

    if trimmed == "O-O" || trimmed == "0-0" {
        return legal
            .iter()
            .find(|m| m.is_castle() && m.castle() == CastleKind::Kingside)
            .copied()
            .ok_or_else(|| SanError::InvalidCastling { notation: san.to_string() });
    }
    if trimmed == "O-O-O" || trimmed == "0-0-0" {
        return legal
            .iter()
            .find(|m| m.is_castle() && m.castle() == CastleKind::Queenside)
            .copied()
            .ok_or_else(|| SanError::InvalidCastling { notation: san.to_string() });
    }

    let (piece_filter, rest) = match trimmed.chars().next() {
        Some(c) if c.is_ascii_uppercase() && c != 'O' => {
            let piece = Piece::from_char(c).ok_or(SanError::InvalidPiece { char: c })?;
            (Some(piece), &trimmed[1..])
        }
        _ => (None, trimmed),
    };

    let rest = rest.replace('x', "");
    let (rest, promotion) = match rest.split_once('=') {
        Some((before, promo)) => {
            let promo_char = promo.chars().next().ok_or(SanError::Empty)?;
            (before, Piece::from_char(promo_char))
        }
        None => (rest.as_str(), None),
    };

    if rest.len() < 2 {
        return Err(SanError::NoMatchingMove { san: san.to_string() });
    }
    let to_str = &rest[rest.len() - 2..];
    let to = to_str.parse().map_err(|_| SanError::NoMatchingMove { san: san.to_string() })?;
    let disambiguator = &rest[..rest.len() - 2];

    let matching: Vec<Move> = legal
        .iter()
        .copied()
        .filter(|m| {
            if m.is_castle() {
                return false;
            }
            if m.to() != to {
                return false;
            }
            let expected_piece = piece_filter.unwrap_or(Piece::Pawn);
            if m.piece().unpack().map(|(_, p)| p) != Some(expected_piece) {
                return false;
            }
            if m.promotion() != promotion {
                return false;
            }
            disambiguator_matches(disambiguator, m.from())
        })
        .collect();

    match matching.as_slice() {
        [] => Err(SanError::NoMatchingMove { san: san.to_string() }),
        [single] => Ok(*single),
        _ => Err(SanError::AmbiguousMove { san: san.to_string() }),
    }
}

fn disambiguator_matches(disambiguator: &str, from: crate::square::Square) -> bool {
    if disambiguator.is_empty() {
        return true;
    }
    if disambiguator.len() == 2 {
        return disambiguator.parse::<crate::square::Square>().map(|sq| sq == from).unwrap_or(false);
    }
    let c = disambiguator.chars().next().unwrap();
    if c.is_ascii_digit() {
        (c as usize - '1' as usize) == from.rank()
    } else {
        (c as usize - 'a' as usize) == from.file()
    }
}
