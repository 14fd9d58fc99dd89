use super::{ChessBoard, Color, Square};
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::sync::Arc;

const BOARD_SIZE: usize = 8;

/// Random keys for position identity: placement, side to move, castling rights and en passant file.
pub struct ZobristHash {
    piece_keys: [[[u64; BOARD_SIZE * BOARD_SIZE]; 6]; 2],
    side_to_move_key: u64,
    castling_keys: [u64; 4],
    en_passant_keys: [u64; BOARD_SIZE],
}

impl ZobristHash {
    fn new(seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);

        // Random numbers for pieces on squares
        let mut piece_keys = [[[0; BOARD_SIZE * BOARD_SIZE]; 6]; 2];
        for color_keys in &mut piece_keys {
            for piece_type_keys in color_keys {
                for square_key in piece_type_keys {
                    *square_key = rng.gen();
                }
            }
        }

        let side_to_move_key = rng.gen();

        let mut castling_keys = [0; 4];
        for key in &mut castling_keys {
            *key = rng.gen();
        }

        let mut en_passant_keys = [0; BOARD_SIZE];
        for file in &mut en_passant_keys {
            *file = rng.gen();
        }

        ZobristHash {
            piece_keys,
            side_to_move_key,
            castling_keys,
            en_passant_keys,
        }
    }

    /// Key of the position for repetition detection.
    ///
    /// The en passant file only contributes when a capture there is actually
    /// available, so a double push nobody can answer does not make the position new.
    pub fn calculate_hash(&self, board: &ChessBoard) -> u64 {
        let mut hash = 0;

        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if let Square::Occupied(piece) = board.squares[row][col] {
                    let color_index = match piece.color {
                        Color::White => 0,
                        Color::Black => 1,
                    };
                    let square_index = row * BOARD_SIZE + col;
                    hash ^= self.piece_keys[color_index][piece.kind.index()][square_index];
                }
            }
        }

        if board.active_color == Color::Black {
            hash ^= self.side_to_move_key;
        }

        for (i, castling) in board.castling_rights.flags().iter().enumerate() {
            if *castling {
                hash ^= self.castling_keys[i];
            }
        }

        if let Some(en_passant) = board.en_passant {
            if board.en_passant_capturable() {
                hash ^= self.en_passant_keys[en_passant.col as usize];
            }
        }

        hash
    }
}

lazy_static! {
    pub static ref ZOBRIST: Arc<ZobristHash> = Arc::new(ZobristHash::new(42));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_boards::chess_board::ChessField;

    fn play(board: &mut ChessBoard, coordinates: &str) {
        let mv = board.legal_moves().find(|m| m.as_algebraic() == coordinates).unwrap();
        board.make_move(mv);
    }

    #[test]
    fn test_hash_is_stable_across_transpositions() {
        let mut a = ChessBoard::starting_position();
        for mv in ["g1f3", "g8f6", "b1c3", "b8c6"] {
            play(&mut a, mv);
        }
        let mut b = ChessBoard::starting_position();
        for mv in ["b1c3", "b8c6", "g1f3", "g8f6"] {
            play(&mut b, mv);
        }
        assert_eq!(a.hash, b.hash);
        assert_ne!(a.hash, ChessBoard::starting_position().hash);
    }

    #[test]
    fn test_side_to_move_and_castling_change_the_hash() {
        let white = ChessBoard::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let black = ChessBoard::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        let fewer_rights = ChessBoard::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kkq - 0 1").unwrap();
        assert_ne!(white.hash, black.hash);
        assert_ne!(white.hash, fewer_rights.hash);
    }

    #[test]
    fn test_en_passant_only_counts_when_capturable() {
        // no black pawn next to e4, the target square is irrelevant
        let with_target = ChessBoard::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").unwrap();
        let without_target = ChessBoard::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(with_target.hash, without_target.hash);

        let with_target = ChessBoard::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        let without_target = ChessBoard::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - - 0 1").unwrap();
        assert_ne!(with_target.hash, without_target.hash);
        assert_eq!(with_target.en_passant, ChessField::from_algebraic("e3"));
    }
}
