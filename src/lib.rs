//! Rules-correct chess referee.
//!
//! A [`GameSession`] tracks one game between a human and an external mover,
//! validating every move of both sides against the same rules and detecting
//! the end of the game.

pub mod chess_boards;
pub mod config;
pub mod error;
pub mod history;
pub mod movers;
pub mod session;

pub use chess_boards::chess_board::{ChessBoard, Color, Move, Piece, PieceType, Termination};
pub use config::{NotationMode, SessionConfig};
pub use error::{FenError, MoveError, MoverError, OracleFailure, ReplayError, SessionError, SessionResult};
pub use history::GameHistory;
pub use movers::ExternalMover;
pub use session::{AcceptedMove, GameSession, GameStatus, PositionSummary, SessionState};
