pub mod fen;
pub mod model;
pub mod outcome;
pub mod san;
pub mod zobrist_hash;

mod chess_board;
mod move_generation;
#[cfg(test)]
pub mod test_utils;

pub use chess_board::ChessBoard;
pub use model::{
    parse_coordinate_move, CastlingRights, CastlingSide, ChessField, Color, Move, Piece, PieceType, SpecialMove,
    Square,
};
pub use move_generation::PseudoLegalMoves;
pub use outcome::Termination;
pub use san::{legal_sans, parse_san, to_san};
pub use zobrist_hash::{ZobristHash, ZOBRIST};
