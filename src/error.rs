//! Error types for the engine core.
//!
//! Each parsing/validation boundary has its own small error enum with a
//! hand-written `Display` impl, in the style used throughout this crate.
//! `EngineError` wraps all of them plus the state-machine and time-control
//! error kinds so a protocol adapter can report a single line to the user.

use std::fmt;

/// Error parsing an XFEN string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    TooFewParts { found: usize },
    InvalidPiece { char: char },
    InvalidCastling { char: char },
    InvalidSideToMove { found: String },
    InvalidEnPassant { found: String },
    InvalidRank { rank: usize },
    TooManyFiles { rank: usize, files: usize },
    InvalidHalfmoveClock { found: String },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => {
                write!(f, "FEN must have at least 4 parts, found {found}")
            }
            FenError::InvalidPiece { char } => write!(f, "invalid piece character '{char}'"),
            FenError::InvalidCastling { char } => write!(f, "invalid castling character '{char}'"),
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidEnPassant { found } => write!(f, "invalid en passant square '{found}'"),
            FenError::InvalidRank { rank } => write!(f, "invalid rank index {rank}"),
            FenError::TooManyFiles { rank, files } => {
                write!(f, "too many files ({files}) in rank {rank}")
            }
            FenError::InvalidHalfmoveClock { found } => {
                write!(f, "invalid halfmove clock '{found}'")
            }
        }
    }
}

impl std::error::Error for FenError {}

/// Error parsing a square in algebraic notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    RankOutOfBounds { rank: usize },
    FileOutOfBounds { file: usize },
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::RankOutOfBounds { rank } => write!(f, "rank {rank} out of bounds"),
            SquareError::FileOutOfBounds { file } => write!(f, "file {file} out of bounds"),
            SquareError::InvalidNotation { notation } => {
                write!(f, "invalid square notation '{notation}'")
            }
        }
    }
}

impl std::error::Error for SquareError {}

/// Error parsing a move in coordinate notation (`e2e4`, `e7e8q`, …).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    InvalidLength { len: usize },
    InvalidSquare(SquareError),
    InvalidPromotion { char: char },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "move must be 4-5 characters, found {len}")
            }
            MoveParseError::InvalidSquare(e) => write!(f, "{e}"),
            MoveParseError::InvalidPromotion { char } => {
                write!(f, "invalid promotion piece '{char}'")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}

impl From<SquareError> for MoveParseError {
    fn from(e: SquareError) -> Self {
        MoveParseError::InvalidSquare(e)
    }
}

/// Error parsing or rendering SAN (Standard Algebraic Notation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    Empty,
    InvalidPiece { char: char },
    AmbiguousMove { san: String },
    NoMatchingMove { san: String },
    InvalidCastling { notation: String },
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanError::Empty => write!(f, "empty SAN string"),
            SanError::InvalidPiece { char } => write!(f, "invalid piece character '{char}' in SAN"),
            SanError::AmbiguousMove { san } => write!(f, "ambiguous move '{san}'"),
            SanError::NoMatchingMove { san } => write!(f, "no legal move matches '{san}'"),
            SanError::InvalidCastling { notation } => {
                write!(f, "invalid castling notation '{notation}'")
            }
        }
    }
}

impl std::error::Error for SanError {}

/// A move that parsed but is not legal in the current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalMoveError {
    pub notation: String,
}

impl fmt::Display for IllegalMoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal move: {}", self.notation)
    }
}

impl std::error::Error for IllegalMoveError {}

/// Command not valid for the engine's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEngineCommandError {
    pub command: String,
}

impl fmt::Display for InvalidEngineCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command not valid in current state: {}", self.command)
    }
}

impl std::error::Error for InvalidEngineCommandError {}

/// A `go` command lacked the fields needed to form any known time budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedTimeControlError {
    pub reason: String,
}

impl fmt::Display for UnsupportedTimeControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported time control: {}", self.reason)
    }
}

impl std::error::Error for UnsupportedTimeControlError {}

/// Top-level error taxonomy surfaced by the engine to a protocol adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Fen(FenError),
    MoveNotation(MoveParseError),
    IllegalMove(IllegalMoveError),
    InvalidCommand(InvalidEngineCommandError),
    UnsupportedTimeControl(UnsupportedTimeControlError),
    San(SanError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Fen(e) => write!(f, "invalid FEN: {e}"),
            EngineError::MoveNotation(e) => write!(f, "invalid move notation: {e}"),
            EngineError::IllegalMove(e) => write!(f, "{e}"),
            EngineError::InvalidCommand(e) => write!(f, "{e}"),
            EngineError::UnsupportedTimeControl(e) => write!(f, "{e}"),
            EngineError::San(e) => write!(f, "invalid SAN: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<FenError> for EngineError {
    fn from(e: FenError) -> Self {
        EngineError::Fen(e)
    }
}

impl From<MoveParseError> for EngineError {
    fn from(e: MoveParseError) -> Self {
        EngineError::MoveNotation(e)
    }
}

impl From<IllegalMoveError> for EngineError {
    fn from(e: IllegalMoveError) -> Self {
        EngineError::IllegalMove(e)
    }
}

impl From<InvalidEngineCommandError> for EngineError {
    fn from(e: InvalidEngineCommandError) -> Self {
        EngineError::InvalidCommand(e)
    }
}

impl From<UnsupportedTimeControlError> for EngineError {
    fn from(e: UnsupportedTimeControlError) -> Self {
        EngineError::UnsupportedTimeControl(e)
    }
}

impl From<SanError> for EngineError {
    fn from(e: SanError) -> Self {
        EngineError::San(e)
    }
}
