use serde::Serialize;

use crate::chess_boards::chess_board::{ChessBoard, ChessField, Color, Piece, Termination};
use crate::session::SessionState;

/// Board contents for display, first row is rank 8 and first column the a-file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionSummary {
    pub squares: [[Option<Piece>; 8]; 8],
    pub to_move: Color,
    pub fen: String,
}

impl PositionSummary {
    pub fn of(board: &ChessBoard) -> Self {
        let mut squares = [[None; 8]; 8];
        for (display_row, row) in squares.iter_mut().enumerate() {
            for (col, square) in row.iter_mut().enumerate() {
                *square = board.piece_at(ChessField::new(7 - display_row as u8, col as u8));
            }
        }
        Self {
            squares,
            to_move: board.active_color,
            fen: board.to_fen(),
        }
    }
}

/// Snapshot of where the game stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStatus {
    pub state: SessionState,
    pub to_move: Color,
    pub in_check: bool,
    pub terminal: bool,
    pub termination: Option<Termination>,
    pub winner: Option<Color>,
    pub fullmove_number: u32,
    pub message: String,
}

/// A move the session accepted, from either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedMove {
    pub san: String,
    /// Coordinate form, e.g. `e2e4`
    pub uci: String,
    pub status: GameStatus,
    pub summary: PositionSummary,
}
