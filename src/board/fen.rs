//! XFEN/Shredder-FEN parsing and rendering, including Chess960 castling
//! notation.

use super::Board;
use crate::castling::CastlingRights;
use crate::error::FenError;
use crate::piece::{Color, PackedPiece, Piece};
use crate::square::Square;

pub(crate) fn parse_xfen(fen: &str, chess960: bool) -> Result<Board, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(FenError::TooFewParts { found: parts.len() });
    }

    let mut board = Board::empty();
    place_pieces(&mut board, parts[0])?;

    board.side_to_move = match parts[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::InvalidSideToMove { found: other.to_string() }),
    };

    board.castling = parse_castling(&board, parts[2], chess960)?;

    board.en_passant = match parts[3] {
        "-" => None,
        s => Some(s.parse().map_err(|_| FenError::InvalidEnPassant { found: s.to_string() })?),
    };

    board.halfmove_clock = match parts.get(4) {
        Some(s) => s.parse().map_err(|_| FenError::InvalidHalfmoveClock { found: (*s).to_string() })?,
        None => 0,
    };

    board.fullmove_number = match parts.get(5) {
        Some(s) => s.parse().unwrap_or(1),
        None => 1,
    };

    board.hash = board.compute_hash();
    Ok(board)
}

fn place_pieces(board: &mut Board, placement: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidRank { rank: ranks.len() });
    }
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top;
        let mut file = 0usize;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
                if file > 8 {
                    return Err(FenError::TooManyFiles { rank, files: file });
                }
                continue;
            }
            if file >= 8 {
                return Err(FenError::TooManyFiles { rank, files: file + 1 });
            }
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
            let sq = Square::new(rank, file);
            board.set_piece(sq, PackedPiece::new(color, piece));
            file += 1;
        }
    }
    Ok(())
}

/// Files (back-rank, left to right) holding a rook of `color`, used to
/// resolve the plain `K`/`Q`/`k`/`q` castling letters to the rightmost/
/// leftmost rook's file rather than assuming the standard a/h files, so
/// a Chess960 position described with the plain letters still derives
/// the correct `castle_cols`.
fn rook_files(board: &Board, color: Color) -> Vec<u8> {
    let rank = match color {
        Color::White => 0,
        Color::Black => 7,
    };
    (0..8u8)
        .filter(|&file| board.piece_at(Square::new(rank, file as usize)).unpack() == Some((color, Piece::Rook)))
        .collect()
}

fn parse_castling(board: &Board, field: &str, chess960: bool) -> Result<CastlingRights, FenError> {
    if field == "-" {
        return Ok(CastlingRights::none());
    }

    let white_king_file = board.king_square(Color::White).file() as u8;
    let black_king_file = board.king_square(Color::Black).file() as u8;

    let mut white_kingside = false;
    let mut white_queenside = false;
    let mut black_kingside = false;
    let mut black_queenside = false;
    // `castle_cols` is one pair shared by both colors (Chess960 starting
    // positions mirror the back rank), so `K`/`k` and `Q`/`q` all refine
    // the same two columns, derived from whichever color's rook the
    // letter names rather than assumed to be the standard a/h files.
    let mut queenside_file = 0u8;
    let mut kingside_file = 7u8;

    for c in field.chars() {
        match c {
            'K' => {
                white_kingside = true;
                kingside_file = rook_files(board, Color::White).into_iter().max().unwrap_or(7);
            }
            'Q' => {
                white_queenside = true;
                queenside_file = rook_files(board, Color::White).into_iter().min().unwrap_or(0);
            }
            'k' => {
                black_kingside = true;
                kingside_file = rook_files(board, Color::Black).into_iter().max().unwrap_or(kingside_file);
            }
            'q' => {
                black_queenside = true;
                queenside_file = rook_files(board, Color::Black).into_iter().min().unwrap_or(queenside_file);
            }
            'A'..='H' if chess960 => {
                let file = c as u8 - b'A';
                if file > white_king_file {
                    white_kingside = true;
                    kingside_file = file;
                } else {
                    white_queenside = true;
                    queenside_file = file;
                }
            }
            'a'..='h' if chess960 => {
                let file = c as u8 - b'a';
                if file > black_king_file {
                    black_kingside = true;
                    kingside_file = file;
                } else {
                    black_queenside = true;
                    queenside_file = file;
                }
            }
            other => return Err(FenError::InvalidCastling { char: other }),
        }
    }

    let mut bits = 0u8;
    if white_kingside {
        bits |= 0b0010;
    }
    if white_queenside {
        bits |= 0b0001;
    }
    if black_kingside {
        bits |= 0b1000;
    }
    if black_queenside {
        bits |= 0b0100;
    }
    Ok(CastlingRights::from_raw_bits(bits, [queenside_file, kingside_file]))
}

pub(crate) fn to_xfen(board: &Board, chess960: bool) -> String {
    let mut ranks = Vec::with_capacity(8);
    for rank in (0..8).rev() {
        let mut s = String::new();
        let mut empty_run = 0u32;
        for file in 0..8 {
            let sq = Square::new(rank, file);
            match board.piece_at(sq).unpack() {
                Some((color, piece)) => {
                    if empty_run > 0 {
                        s.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    s.push(piece.to_fen_char(color));
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            s.push_str(&empty_run.to_string());
        }
        ranks.push(s);
    }
    let placement = ranks.join("/");

    let side = match board.side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };

    let castling = board.castling.to_fen_string(chess960);

    let ep = match board.en_passant {
        Some(sq) => sq.to_string(),
        None => "-".to_string(),
    };

    format!(
        "{} {} {} {} {} {}",
        placement, side, castling, ep, board.halfmove_clock, board.fullmove_number
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_roundtrip() {
        let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let board = parse_xfen(start, false).unwrap();
        assert_eq!(to_xfen(&board, false), start);
    }

    #[test]
    fn kiwipete_roundtrip() {
        let kiwipete =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let board = parse_xfen(kiwipete, false).unwrap();
        assert_eq!(to_xfen(&board, false), kiwipete);
    }

    #[test]
    fn missing_clocks_default() {
        let board = parse_xfen("8/8/8/8/8/8/8/K6k w - - ", false).unwrap();
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 1);
    }

    #[test]
    fn rejects_too_few_parts() {
        assert!(parse_xfen("8/8/8/8/8/8/8/8", false).is_err());
    }

    #[test]
    fn rejects_invalid_piece_char() {
        assert!(parse_xfen("8/8/8/8/8/8/8/KXk5 w - - 0 1", false).is_err());
    }

    #[test]
    fn en_passant_square_parses() {
        let board = parse_xfen(
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
            false,
        )
        .unwrap();
        assert_eq!(board.en_passant_square(), Some("d6".parse().unwrap()));
    }

    #[test]
    fn plain_castling_letters_derive_rook_files_from_the_board() {
        // Chess960 start with the king on b and rooks on a/h, described
        // with the plain KQkq letters rather than explicit A-H/a-h.
        // Kingside castling must use the rook actually on h, not an
        // assumed file unrelated to where the rook sits.
        let board = parse_xfen("rkr2bnb/pppppppp/8/8/8/8/PPPPPPPP/RKR2BNB w KQkq - 0 1", true).unwrap();
        assert_eq!(board.castling_rights().kingside_rook_file(), 2);
        assert_eq!(board.castling_rights().queenside_rook_file(), 0);
    }
}
