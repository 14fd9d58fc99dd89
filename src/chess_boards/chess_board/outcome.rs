use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ChessBoard, Color, PieceType};

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FiftyMoveRule,
}

impl Termination {
    pub fn winner(&self) -> Option<Color> {
        match self {
            Termination::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner().is_none()
    }

    /// Human readable result line.
    pub fn message(&self) -> String {
        match self {
            Termination::Checkmate { winner } => format!("Checkmate, {} wins", winner),
            Termination::Stalemate => "Draw by stalemate".to_string(),
            Termination::InsufficientMaterial => "Draw by insufficient material".to_string(),
            Termination::ThreefoldRepetition => "Draw by threefold repetition".to_string(),
            Termination::FiftyMoveRule => "Draw by the fifty-move rule".to_string(),
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Checkmate { winner } => write!(f, "checkmate ({} wins)", winner),
            Termination::Stalemate => write!(f, "stalemate"),
            Termination::InsufficientMaterial => write!(f, "insufficient material"),
            Termination::ThreefoldRepetition => write!(f, "threefold repetition"),
            Termination::FiftyMoveRule => write!(f, "fifty-move rule"),
        }
    }
}

impl ChessBoard {
    /// Neither side can ever deliver mate: bare kings, a single minor piece,
    /// or bishops that all stand on squares of one color.
    pub fn is_insufficient_material(&self) -> bool {
        let mut knights = 0;
        let mut bishop_squares = Vec::new();
        for (field, piece) in self.pieces() {
            match piece.kind {
                PieceType::King => {}
                PieceType::Knight => knights += 1,
                PieceType::Bishop => bishop_squares.push(field.is_light()),
                PieceType::Pawn | PieceType::Rook | PieceType::Queen => return false,
            }
        }

        let minors = knights + bishop_squares.len();
        if minors <= 1 {
            return true;
        }
        knights == 0 && bishop_squares.windows(2).all(|pair| pair[0] == pair[1])
    }

    pub fn is_draw_by_fifty_move_rule(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Classifies the position on its own; repetition needs the history and is checked there.
    ///
    /// Checkmate wins over every draw condition, so a mating move that also
    /// reaches the fiftieth move still ends the game as checkmate.
    pub fn termination(&self) -> Option<Termination> {
        if !self.has_legal_move() {
            return Some(if self.is_check() {
                Termination::Checkmate {
                    winner: self.active_color.opposite(),
                }
            } else {
                Termination::Stalemate
            });
        }
        if self.is_insufficient_material() {
            return Some(Termination::InsufficientMaterial);
        }
        if self.is_draw_by_fifty_move_rule() {
            return Some(Termination::FiftyMoveRule);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> ChessBoard {
        ChessBoard::from_fen(fen).unwrap()
    }

    #[test]
    fn test_insufficient_material() {
        assert!(board("4k3/8/8/8/8/8/8/4K3 w - - 0 1").is_insufficient_material());
        assert!(board("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1").is_insufficient_material());
        assert!(board("4k3/8/8/8/8/8/8/1N2K3 b - - 0 1").is_insufficient_material());
        // bishops on c1 and f8 share the dark squares
        assert!(board("5bk1/8/8/8/8/8/8/2B1K3 w - - 0 1").is_insufficient_material());

        assert!(!board("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").is_insufficient_material());
        assert!(!board("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1").is_insufficient_material());
        assert!(!board("4k3/8/8/8/8/8/8/1NB1K3 w - - 0 1").is_insufficient_material());
        assert!(!board("4k3/8/8/8/8/8/8/1N2K1N1 w - - 0 1").is_insufficient_material());
        assert!(!board("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").is_insufficient_material());
    }

    #[test]
    fn test_termination_priority() {
        let mate = board("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(mate.termination(), Some(Termination::Checkmate { winner: Color::Black }));

        let stalemate = board("1k6/8/8/8/8/1r6/7r/K7 w - - 0 1");
        assert_eq!(stalemate.termination(), Some(Termination::Stalemate));

        let fifty = board("4k3/8/8/8/8/8/8/R3K3 w - - 100 80");
        assert_eq!(fifty.termination(), Some(Termination::FiftyMoveRule));
        let ninety_nine = board("4k3/8/8/8/8/8/8/R3K3 w - - 99 80");
        assert_eq!(ninety_nine.termination(), None);

        // mate on the hundredth half move is still mate
        let mate_at_fifty = board("k7/8/1K6/8/8/8/8/7R w - - 99 80");
        let mut after = mate_at_fifty.clone();
        let mv = mate_at_fifty.legal_moves().find(|m| m.as_algebraic() == "h1h8").unwrap();
        after.make_move(mv);
        assert_eq!(after.halfmove_clock, 100);
        assert_eq!(after.termination(), Some(Termination::Checkmate { winner: Color::White }));

        assert_eq!(ChessBoard::starting_position().termination(), None);
    }

    #[test]
    fn test_messages() {
        let mate = Termination::Checkmate { winner: Color::Black };
        assert_eq!(mate.message(), "Checkmate, black wins");
        assert_eq!(mate.winner(), Some(Color::Black));
        assert!(!mate.is_draw());
        assert!(Termination::ThreefoldRepetition.is_draw());
        assert_eq!(Termination::FiftyMoveRule.to_string(), "fifty-move rule");
        assert_eq!(
            serde_json::to_string(&mate).unwrap(),
            r#"{"kind":"checkmate","winner":"black"}"#
        );
    }
}
