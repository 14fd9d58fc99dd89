use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use super::ExternalMover;
use crate::chess_boards::chess_board::{to_san, ChessBoard, Move};
use crate::config::NotationMode;
use crate::error::MoverError;
use crate::history::GameHistory;

/// Plays a uniformly random legal move, reproducibly for a given seed.
pub struct RandomMover {
    rng: Pcg64,
    start: ChessBoard,
}

impl RandomMover {
    pub fn new(seed: u64) -> Self {
        Self::from_position(seed, ChessBoard::starting_position())
    }

    /// A mover for games that began from `start` instead of the initial position.
    pub fn from_position(seed: u64, start: ChessBoard) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            start,
        }
    }
}

#[async_trait]
impl ExternalMover for RandomMover {
    fn name(&self) -> &str {
        "random"
    }

    async fn propose(&mut self, history: &[String]) -> Result<String, MoverError> {
        let history = GameHistory::replay(self.start.clone(), history, NotationMode::Lenient)
            .map_err(|e| MoverError::Protocol(e.to_string()))?;
        let board = history.current();
        let moves: Vec<Move> = board.legal_moves().collect();
        let mv = moves.choose(&mut self.rng).ok_or(MoverError::Exhausted)?;
        Ok(to_san(board, mv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_boards::chess_board::legal_sans;

    #[tokio::test]
    async fn test_proposes_legal_moves_reproducibly() {
        let history = vec!["e4".to_string(), "e5".to_string()];
        let board = GameHistory::replay(ChessBoard::starting_position(), &history, NotationMode::Lenient)
            .unwrap()
            .current()
            .clone();

        let mut first = RandomMover::new(7);
        let mut second = RandomMover::new(7);
        for _ in 0..5 {
            let a = first.propose(&history).await.unwrap();
            let b = second.propose(&history).await.unwrap();
            assert_eq!(a, b);
            assert!(legal_sans(&board).contains(&a));
        }
    }

    #[tokio::test]
    async fn test_no_move_when_mated() {
        let history: Vec<String> = ["f3", "e5", "g4", "Qh4"].iter().map(|s| s.to_string()).collect();
        let mut mover = RandomMover::new(1);
        assert!(matches!(mover.propose(&history).await, Err(MoverError::Exhausted)));
    }
}
