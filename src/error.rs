//! Error types for the engine's external surface.

use std::fmt;

/// FEN parsing failure. The engine keeps its previous position when
/// `set_position` returns one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// FEN string has too few fields (needs at least 4)
    TooFewParts { found: usize },
    /// Invalid piece character in the placement field
    InvalidPiece { piece: char },
    /// Invalid castling character
    InvalidCastling { castling: char },
    /// Invalid side to move (must be 'w' or 'b')
    InvalidSideToMove { found: String },
    /// Invalid en passant field
    InvalidEnPassant { found: String },
    /// More than eight ranks in the placement field
    TooManyRanks,
    /// More than eight files in a rank
    TooManyFiles { rank: usize },
    /// A side has no king, or more than one
    BadKingCount { color: &'static str },
    /// The two kings are on adjacent squares
    KingsAdjacent,
    /// A pawn sits on the first or last rank
    PawnOnBackRank,
    /// The side that just moved is still in check
    SideNotToMoveInCheck,
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => {
                write!(f, "FEN must have at least 4 fields, found {found}")
            }
            FenError::InvalidPiece { piece } => {
                write!(f, "invalid piece character '{piece}' in FEN")
            }
            FenError::InvalidCastling { castling } => {
                write!(f, "invalid castling character '{castling}' in FEN")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "invalid en passant square '{found}'")
            }
            FenError::TooManyRanks => write!(f, "too many ranks in FEN"),
            FenError::TooManyFiles { rank } => {
                write!(f, "too many files in rank {rank}")
            }
            FenError::BadKingCount { color } => {
                write!(f, "{color} must have exactly one king")
            }
            FenError::KingsAdjacent => write!(f, "kings are on adjacent squares"),
            FenError::PawnOnBackRank => write!(f, "pawn on the first or last rank"),
            FenError::SideNotToMoveInCheck => {
                write!(f, "the side that just moved is still in check")
            }
        }
    }
}

impl std::error::Error for FenError {}

/// Coordinate-move application failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Move string has an invalid length (must be 4-5 characters)
    InvalidLength { len: usize },
    /// Invalid square notation in the move
    InvalidSquare { notation: String },
    /// Move is not legal in the current position
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "move must be 4-5 characters, found {len}")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "invalid square notation in '{notation}'")
            }
            MoveParseError::IllegalMove { notation } => {
                write!(f, "illegal move '{notation}'")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}
