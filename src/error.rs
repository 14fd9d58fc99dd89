//! Error types for the referee
//!
//! Input problems (FEN, move text) are kept apart from failures of the external
//! mover so callers can tell a rejected human move from a broken reply.

use std::time::Duration;

use thiserror::Error;

use crate::chess_boards::chess_board::{ChessField, Color, Termination};
use crate::session::SessionState;

/// Errors raised while importing a FEN position
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN must have 6 space separated fields, found {0}")]
    FieldCount(usize),

    #[error("FEN board must describe 8 ranks, found {0}")]
    RankCount(usize),

    #[error("invalid piece character '{0}' in FEN board")]
    InvalidPiece(char),

    #[error("rank {rank} of the FEN board describes {files} files")]
    RankLength { rank: usize, files: usize },

    #[error("invalid active color '{0}'")]
    ActiveColor(String),

    #[error("invalid castling field '{0}'")]
    Castling(String),

    #[error("invalid en passant square '{0}'")]
    EnPassant(String),

    #[error("invalid {field} '{value}'")]
    Counter { field: &'static str, value: String },

    #[error("expected exactly one {color} king, found {count}")]
    KingCount { color: Color, count: usize },

    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(ChessField),

    #[error("the side not to move is in check")]
    OpponentInCheck,
}

/// Reasons a move string is not accepted in the current position
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// The text cannot be read as a move at all
    #[error("malformed move '{input}': {reason}")]
    Malformed { input: String, reason: &'static str },

    /// Readable, but no legal move matches it
    #[error("illegal move '{input}': {reason}")]
    Illegal { input: String, reason: String },

    /// Readable, but more than one legal move matches it
    #[error("ambiguous move '{input}', could be any of {candidates:?}")]
    Ambiguous { input: String, candidates: Vec<String> },
}

impl MoveError {
    pub fn input(&self) -> &str {
        match self {
            MoveError::Malformed { input, .. } | MoveError::Illegal { input, .. } | MoveError::Ambiguous { input, .. } => {
                input
            }
        }
    }
}

/// A move list that cannot be replayed from its start position
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("move {ply} ('{input}') does not replay")]
pub struct ReplayError {
    /// One-based ply of the offending move
    pub ply: usize,
    pub input: String,
    #[source]
    pub source: MoveError,
}

/// Transport failures of an external mover
#[derive(Error, Debug)]
pub enum MoverError {
    #[error("external mover unavailable: {0}")]
    Unavailable(String),

    #[error("external mover i/o failed")]
    Io(#[from] std::io::Error),

    #[error("external mover protocol error: {0}")]
    Protocol(String),

    #[error("external mover has no more moves")]
    Exhausted,
}

/// Why a reply could not be obtained from the external mover
#[derive(Error, Debug)]
pub enum OracleFailure {
    #[error(transparent)]
    Mover(#[from] MoverError),

    #[error("external mover did not answer within {0:?}")]
    Timeout(Duration),

    #[error("external mover proposed '{candidate}' which was rejected")]
    Rejected {
        candidate: String,
        #[source]
        reason: MoveError,
    },
}

/// Errors surfaced by [`crate::session::GameSession`]
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("move rejected")]
    Rejected(#[from] MoveError),

    #[error("reply failed")]
    Oracle(#[from] OracleFailure),

    #[error("game is over: {0}")]
    GameOver(Termination),

    #[error("operation not allowed while {state}")]
    OutOfTurn { state: SessionState },

    #[error("history is corrupted, restart the session")]
    CorruptedHistory(#[from] ReplayError),
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
