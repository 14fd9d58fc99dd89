use std::iter;

use crate::chess_boards::chess_board::{parse_san, to_san, ChessBoard, Move, Termination};
use crate::config::NotationMode;
use crate::error::{MoveError, ReplayError};

/// One accepted move and the position it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mv: Move,
    pub san: String,
    pub position: ChessBoard,
}

/// Append-only record of a game from its start position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameHistory {
    start: ChessBoard,
    entries: Vec<HistoryEntry>,
}

impl Default for GameHistory {
    fn default() -> Self {
        Self::new(ChessBoard::starting_position())
    }
}

impl GameHistory {
    pub fn new(start: ChessBoard) -> Self {
        Self {
            start,
            entries: Vec::new(),
        }
    }

    /// Rebuilds a history by playing `moves` from `start`.
    ///
    /// Fails on the first move that does not resolve to exactly one legal move,
    /// including any move played after the game has ended.
    pub fn replay<S: AsRef<str>>(start: ChessBoard, moves: &[S], mode: NotationMode) -> Result<Self, ReplayError> {
        moves
            .iter()
            .enumerate()
            .try_fold(GameHistory::new(start), |mut history, (index, text)| {
                let text = text.as_ref();
                let to_error = |source: MoveError| ReplayError {
                    ply: index + 1,
                    input: source.input().to_string(),
                    source,
                };
                if let Some(termination) = history.termination() {
                    return Err(to_error(MoveError::Illegal {
                        input: text.to_string(),
                        reason: format!("the game already ended by {}", termination),
                    }));
                }
                let mv = parse_san(history.current(), text, mode).map_err(to_error)?;
                history.push(mv);
                Ok(history)
            })
    }

    pub fn start(&self) -> &ChessBoard {
        &self.start
    }

    pub fn current(&self) -> &ChessBoard {
        self.entries.last().map_or(&self.start, |entry| &entry.position)
    }

    /// Applies a legal move of the current position and records it.
    pub fn push(&mut self, mv: Move) -> &HistoryEntry {
        let before = self.current();
        let san = to_san(before, &mv);
        let mut position = before.clone();
        position.make_move(mv);
        self.entries.push(HistoryEntry { mv, san, position });
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn sans(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.san.clone()).collect()
    }

    /// Moves in coordinate notation, as UCI engines expect them.
    pub fn coordinates(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.mv.as_algebraic()).collect()
    }

    fn positions(&self) -> impl DoubleEndedIterator<Item = &ChessBoard> {
        iter::once(&self.start).chain(self.entries.iter().map(|entry| &entry.position))
    }

    /// How often the current position has occurred, itself included.
    ///
    /// Only positions since the last capture or pawn move can repeat it.
    pub fn repetition_count(&self) -> usize {
        let current = self.current();
        let window = current.halfmove_clock as usize + 1;
        self.positions()
            .rev()
            .take(window)
            .filter(|position| same_position(position, current))
            .count()
    }

    /// Terminal condition of the current position, if any.
    ///
    /// Checkmate, stalemate and insufficient material are decided first,
    /// then threefold repetition, then the fifty-move rule.
    pub fn termination(&self) -> Option<Termination> {
        let on_board = self.current().termination();
        if let Some(decided @ (Termination::Checkmate { .. } | Termination::Stalemate | Termination::InsufficientMaterial)) =
            on_board
        {
            return Some(decided);
        }
        if self.repetition_count() >= 3 {
            return Some(Termination::ThreefoldRepetition);
        }
        on_board
    }
}

/// Positions repeat when placement, side to move, castling rights and
/// any usable en passant capture agree.
fn same_position(a: &ChessBoard, b: &ChessBoard) -> bool {
    a.hash == b.hash
        && a.squares == b.squares
        && a.active_color == b.active_color
        && a.castling_rights == b.castling_rights
        && a.en_passant_capturable() == b.en_passant_capturable()
        && (!a.en_passant_capturable() || a.en_passant == b.en_passant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_boards::chess_board::{CastlingSide, Color};

    fn replay(moves: &[&str]) -> GameHistory {
        GameHistory::replay(ChessBoard::starting_position(), moves, NotationMode::Lenient).unwrap()
    }

    #[test]
    fn test_replay_reproduces_position() {
        let history = replay(&["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]);
        assert_eq!(history.len(), 6);
        assert_eq!(
            history.current().to_fen(),
            "r1bqkbnr/1ppp1ppp/p1n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 4"
        );
        assert_eq!(history.sans(), vec!["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]);
        assert_eq!(history.coordinates()[0], "e2e4");

        let again = GameHistory::replay(ChessBoard::starting_position(), &history.sans(), NotationMode::Strict).unwrap();
        assert_eq!(again, history);
    }

    #[test]
    fn test_replay_reports_first_bad_move() {
        let error =
            GameHistory::replay(ChessBoard::starting_position(), &["e4", "e5", "Ke3"], NotationMode::Lenient).unwrap_err();
        assert_eq!(error.ply, 3);
        assert_eq!(error.input, "Ke3");
        assert!(matches!(error.source, MoveError::Illegal { .. }));
    }

    #[test]
    fn test_replay_rejects_moves_after_mate() {
        let error = GameHistory::replay(
            ChessBoard::starting_position(),
            &["f3", "e5", "g4", "Qh4", "a3"],
            NotationMode::Lenient,
        )
        .unwrap_err();
        assert_eq!(error.ply, 5);
    }

    #[test]
    fn test_threefold_on_third_occurrence() {
        let shuffle = ["Nf3", "Nf6", "Ng1", "Ng8"];
        let mut history = GameHistory::default();
        for text in shuffle {
            let mv = parse_san(history.current(), text, NotationMode::Lenient).unwrap();
            history.push(mv);
        }
        // start position seen twice
        assert_eq!(history.repetition_count(), 2);
        assert_eq!(history.termination(), None);

        for text in shuffle {
            let mv = parse_san(history.current(), text, NotationMode::Lenient).unwrap();
            history.push(mv);
        }
        assert_eq!(history.repetition_count(), 3);
        assert_eq!(history.termination(), Some(Termination::ThreefoldRepetition));
    }

    #[test]
    fn test_castling_rights_break_repetition() {
        // the rook shuffle costs the kingside right, so the first position never recurs
        let history = replay(&["Nf3", "Nf6", "Rg1", "Rg8", "Rh1", "Rh8", "Rg1", "Rg8", "Rh1", "Rh8"]);
        assert_eq!(history.repetition_count(), 2);
        assert_eq!(history.termination(), None);
    }

    #[test]
    fn test_castling_rights_only_narrow() {
        let history = replay(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "O-O", "Nf6", "Re1", "Rg8", "Rf1", "Rh8"]);
        let positions: Vec<&ChessBoard> = history.positions().collect();
        for pair in positions.windows(2) {
            assert!(pair[1].castling_rights.is_subset_of(&pair[0].castling_rights));
        }
        // rook back on h8 does not bring the right back
        assert!(!history.current().castling_rights.has(Color::Black, CastlingSide::Kingside));
        assert!(history.current().castling_rights.has(Color::Black, CastlingSide::Queenside));
    }

    #[test]
    fn test_mate_is_reported() {
        let history = replay(&["f3", "e5", "g4", "Qh4"]);
        assert_eq!(history.current().active_color, Color::White);
        assert_eq!(history.termination(), Some(Termination::Checkmate { winner: Color::Black }));
        assert_eq!(history.last().map(|e| e.san.as_str()), Some("Qh4#"));
    }
}
