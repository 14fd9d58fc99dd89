use super::zobrist_hash::ZOBRIST;
use super::{fen, CastlingRights, CastlingSide, ChessField, Color, Move, Piece, PieceType, SpecialMove, Square};
use crate::error::FenError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChessBoard {
    pub squares: [[Square; 8]; 8],
    pub active_color: Color,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<ChessField>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub hash: u64,
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::starting_position()
    }
}

impl ChessBoard {
    /// Creates an empty chess board
    pub fn empty() -> Self {
        Self {
            squares: [[Square::Empty; 8]; 8],
            active_color: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        }
    }

    pub fn starting_position() -> Self {
        let mut board = Self::empty();
        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        for color in [Color::White, Color::Black] {
            for (col, kind) in back_rank.iter().enumerate() {
                board.squares[color.back_row() as usize][col] = Square::Occupied(Piece::new(color, *kind));
                board.squares[color.pawn_start_row() as usize][col] =
                    Square::Occupied(Piece::new(color, PieceType::Pawn));
            }
        }
        board.castling_rights = CastlingRights::ALL;
        board.hash = ZOBRIST.calculate_hash(&board);
        board
    }

    /// Parses and validates a FEN position.
    ///
    /// Castling rights whose king or rook is not on its home square are dropped.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = fen::from_fen(fen)?;

        for color in [Color::White, Color::Black] {
            let count = board
                .pieces()
                .filter(|(_, p)| p.color == color && p.kind == PieceType::King)
                .count();
            if count != 1 {
                return Err(FenError::KingCount { color, count });
            }
        }

        if let Some((field, _)) = board
            .pieces()
            .find(|(field, p)| p.kind == PieceType::Pawn && (field.row == 0 || field.row == 7))
        {
            return Err(FenError::PawnOnBackRank(field));
        }

        if let Some(target) = board.en_passant {
            let mover = board.active_color;
            let pushed = target.offset(-mover.forward(), 0);
            let expected_row = mover.opposite().pawn_start_row() as i8 + mover.opposite().forward();
            let pawn_there = pushed
                .and_then(|f| board.piece_at(f))
                .is_some_and(|p| p == Piece::new(mover.opposite(), PieceType::Pawn));
            if target.row as i8 != expected_row || board.piece_at(target).is_some() || !pawn_there {
                return Err(FenError::EnPassant(target.as_algebraic()));
            }
        }

        for color in [Color::White, Color::Black] {
            for side in [CastlingSide::Kingside, CastlingSide::Queenside] {
                let row = color.back_row();
                let king_home = board.piece_at(ChessField::new(row, 4)) == Some(Piece::new(color, PieceType::King));
                let rook_home = board.piece_at(ChessField::new(row, side.rook_from_col()))
                    == Some(Piece::new(color, PieceType::Rook));
                if !(king_home && rook_home) {
                    board.castling_rights.revoke(color, side);
                }
            }
        }

        if board.is_in_check(board.active_color.opposite()) {
            return Err(FenError::OpponentInCheck);
        }

        board.hash = ZOBRIST.calculate_hash(&board);
        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        fen::to_fen(self)
    }
}

impl ChessBoard {
    pub fn piece_at(&self, field: ChessField) -> Option<Piece> {
        self.squares[field.row as usize][field.col as usize].piece()
    }

    fn set(&mut self, field: ChessField, square: Square) {
        self.squares[field.row as usize][field.col as usize] = square;
    }

    /// Returns an iterator over all pieces on the chessboard along with their coordinates.
    pub fn pieces(&self) -> impl Iterator<Item = (ChessField, Piece)> + '_ {
        ChessField::all().filter_map(move |field| self.piece_at(field).map(|piece| (field, piece)))
    }

    /// Applies a move produced by the move generator for this position.
    ///
    /// No legality check happens here; callers filter through
    /// [`ChessBoard::is_legal`] or take moves from [`ChessBoard::legal_moves`].
    pub fn make_move(&mut self, mv: Move) {
        self.apply_move(mv);
        self.hash = ZOBRIST.calculate_hash(self);
    }

    /// Like [`ChessBoard::make_move`] but leaves the position key stale.
    pub(crate) fn apply_move(&mut self, mv: Move) {
        let color = self.active_color;

        if mv.piece == PieceType::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        self.set(mv.from, Square::Empty);
        if mv.special == Some(SpecialMove::EnPassant) {
            // the captured pawn sits beside the origin, not on the target square
            self.set(ChessField::new(mv.from.row, mv.to.col), Square::Empty);
        }
        let placed = Piece::new(color, mv.promotion.unwrap_or(mv.piece));
        self.set(mv.to, Square::Occupied(placed));

        if let Some(side) = mv.castling_side() {
            let row = mv.from.row;
            self.set(ChessField::new(row, side.rook_from_col()), Square::Empty);
            self.set(
                ChessField::new(row, side.rook_to_col()),
                Square::Occupied(Piece::new(color, PieceType::Rook)),
            );
        }

        if mv.piece == PieceType::King {
            self.castling_rights.revoke_all(color);
        }
        // a rook leaving its corner or being captured there
        self.revoke_castling_through(mv.from);
        self.revoke_castling_through(mv.to);

        self.en_passant = None;
        if mv.piece == PieceType::Pawn && mv.from.row.abs_diff(mv.to.row) == 2 {
            self.en_passant = Some(ChessField::new((mv.from.row + mv.to.row) / 2, mv.from.col));
        }

        self.active_color = color.opposite();
        if self.active_color == Color::White {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
    }

    fn revoke_castling_through(&mut self, field: ChessField) {
        for color in [Color::White, Color::Black] {
            for side in [CastlingSide::Kingside, CastlingSide::Queenside] {
                if field == ChessField::new(color.back_row(), side.rook_from_col()) {
                    self.castling_rights.revoke(color, side);
                }
            }
        }
    }

    /// True if the square is attacked by the opponent of the side to move.
    pub fn is_square_attacked(&self, field: ChessField) -> bool {
        self.is_square_attacked_by_color(field, self.active_color.opposite())
    }

    pub fn is_square_attacked_by_color(&self, field: ChessField, opponent_color: Color) -> bool {
        // Check for attacks by sliding pieces
        const DIRECTIONS: [(i8, i8); 8] = [
            (-1, 0),
            (1, 0),
            (0, -1),
            (0, 1), // Rook-like directions (orthogonal)
            (-1, -1),
            (-1, 1),
            (1, -1),
            (1, 1), // Bishop-like directions (diagonals)
        ];
        for &(dx, dy) in &DIRECTIONS {
            let is_diagonal = dx != 0 && dy != 0;
            let mut current = field;

            while let Some(next) = current.offset(dx, dy) {
                current = next;
                match self.piece_at(current) {
                    None => continue,
                    Some(piece) => {
                        if piece.color == opponent_color {
                            match piece.kind {
                                PieceType::Rook if !is_diagonal => return true,
                                PieceType::Bishop if is_diagonal => return true,
                                PieceType::Queen => return true,
                                _ => {}
                            }
                        }
                        break;
                    }
                }
            }
        }

        // a pawn attacks diagonally forward, so look backwards from the target
        let pawn_attacks = [(-opponent_color.forward(), -1), (-opponent_color.forward(), 1)];
        if self.check_attack(field, opponent_color, &pawn_attacks, PieceType::Pawn) {
            return true;
        }

        const KNIGHT_OFFSETS: [(i8, i8); 8] = [(-2, -1), (-1, -2), (1, -2), (2, -1), (2, 1), (1, 2), (-1, 2), (-2, 1)];
        if self.check_attack(field, opponent_color, &KNIGHT_OFFSETS, PieceType::Knight) {
            return true;
        }

        self.check_attack(field, opponent_color, &DIRECTIONS, PieceType::King)
    }

    fn check_attack(&self, field: ChessField, opponent_color: Color, offsets: &[(i8, i8)], piece_type: PieceType) -> bool {
        offsets.iter().any(|&(dx, dy)| {
            field
                .offset(dx, dy)
                .and_then(|f| self.piece_at(f))
                .is_some_and(|piece| piece.color == opponent_color && piece.kind == piece_type)
        })
    }

    pub fn find_king_position(&self, color: Color) -> Option<ChessField> {
        self.pieces()
            .find(|(_, piece)| piece.color == color && piece.kind == PieceType::King)
            .map(|(field, _)| field)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.find_king_position(color)
            .is_some_and(|king| self.is_square_attacked_by_color(king, color.opposite()))
    }

    /// True if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.is_in_check(self.active_color)
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_check() && !self.has_legal_move()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && !self.has_legal_move()
    }

    /// True when the side to move can legally take on the en passant square.
    ///
    /// A pawn pinned against its own king does not count.
    pub fn en_passant_capturable(&self) -> bool {
        let Some(target) = self.en_passant else {
            return false;
        };
        let mover = self.active_color;
        [-1, 1].iter().any(|&dc| {
            let Some(from) = target.offset(-mover.forward(), dc) else {
                return false;
            };
            self.piece_at(from) == Some(Piece::new(mover, PieceType::Pawn))
                && self.is_legal(
                    &Move::new(PieceType::Pawn, from, target)
                        .with_capture(PieceType::Pawn)
                        .with_special(SpecialMove::EnPassant),
                )
        })
    }

    pub fn render_to_string(&self) -> String {
        let mut board_representation = String::new();
        board_representation.push_str("    a   b   c   d   e   f   g   h  \n");
        board_representation.push_str("  ┌───┬───┬───┬───┬───┬───┬───┬───┐\n");

        for row in (0..8).rev() {
            // Render rows from top (8) to bottom (1)
            board_representation.push_str(&format!("{} │", row + 1));
            for col in 0..8 {
                let square = match &self.squares[row][col] {
                    Square::Empty => ' ',
                    Square::Occupied(piece) => piece.to_char(),
                };
                board_representation.push_str(&format!(" {} │", square));
            }
            board_representation.push_str(&format!(" {}\n", row + 1));

            if row > 0 {
                board_representation.push_str("  ├───┼───┼───┼───┼───┼───┼───┼───┤\n");
            }
        }

        board_representation.push_str("  └───┴───┴───┴───┴───┴───┴───┴───┘\n");
        board_representation.push_str("    a   b   c   d   e   f   g   h  \n");

        board_representation
    }
}

#[cfg(test)]
mod tests {
    use super::super::fen::INITIAL_POSITION;
    use super::*;

    fn field(square: &str) -> ChessField {
        ChessField::from_algebraic(square).unwrap()
    }

    /// Finds the generated move with the given coordinate notation.
    fn play(board: &mut ChessBoard, coordinates: &str) {
        let mv = board
            .legal_moves()
            .find(|m| m.as_algebraic() == coordinates)
            .unwrap_or_else(|| panic!("{} is not legal in {}", coordinates, board.to_fen()));
        board.make_move(mv);
    }

    #[test]
    fn test_starting_position_matches_fen() {
        assert_eq!(ChessBoard::starting_position(), ChessBoard::from_fen(INITIAL_POSITION).unwrap());
        assert_eq!(ChessBoard::default().to_fen(), INITIAL_POSITION);
    }

    #[test]
    fn test_from_fen_requires_one_king_each() {
        assert_eq!(
            ChessBoard::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::KingCount {
                color: Color::Black,
                count: 0
            })
        );
        assert_eq!(
            ChessBoard::from_fen("k7/8/8/8/8/8/8/3KK3 w - - 0 1"),
            Err(FenError::KingCount {
                color: Color::White,
                count: 2
            })
        );
    }

    #[test]
    fn test_from_fen_rejects_impossible_positions() {
        assert_eq!(ChessBoard::from_fen("k7/8/8/8/8/8/8/K3r3 b - - 0 1"), Err(FenError::OpponentInCheck));
        assert!(matches!(
            ChessBoard::from_fen("k7/8/8/8/8/8/8/K3P3 w - - 0 1"),
            Err(FenError::PawnOnBackRank(_))
        ));
        assert!(matches!(
            ChessBoard::from_fen("4k3/8/8/8/8/8/8/4K3 b - e3 0 1"),
            Err(FenError::EnPassant(_))
        ));
    }

    #[test]
    fn test_from_fen_drops_unbacked_castling_rights() {
        let board = ChessBoard::from_fen("r3k3/8/8/8/8/8/8/4K2R w KQkq - 0 1").unwrap();
        assert_eq!(board.castling_rights.flags(), [true, false, false, true]);
    }

    #[test]
    fn test_if_field_is_attacked() {
        let board = ChessBoard::from_fen("k7/2P5/8/8/8/8/3p4/7K w - - 0 1").unwrap();
        assert!(board.is_square_attacked(field("c1")));
        assert!(!board.is_square_attacked(field("d1")));
        assert!(board.is_square_attacked(field("e1")));

        // pawns attack diagonally even onto empty squares, never straight ahead
        assert!(!board.is_square_attacked(field("c8")));
        assert!(board.is_square_attacked_by_color(field("b8"), Color::White));
        assert!(!board.is_square_attacked_by_color(field("c8"), Color::White));
        assert!(board.is_square_attacked_by_color(field("d8"), Color::White));
    }

    #[test]
    fn test_sliding_attacks_are_blocked() {
        let board = ChessBoard::from_fen("4k3/8/8/8/r2P3K/8/8/8 w - - 0 1").unwrap();
        assert!(board.is_square_attacked_by_color(field("d4"), Color::Black));
        assert!(!board.is_square_attacked_by_color(field("e4"), Color::Black));
        assert!(!board.is_check());
    }

    #[test]
    fn test_checkmate() {
        let board = ChessBoard::from_fen("1k6/8/8/8/8/8/PPn5/KN6 w - - 0 1").unwrap();
        assert!(board.is_checkmate());

        //stalemate
        let board = ChessBoard::from_fen("1k6/8/8/8/8/1r6/7r/K7 w - - 0 1").unwrap();
        assert!(!board.is_checkmate());
    }

    #[test]
    fn test_stalemate() {
        let board = ChessBoard::from_fen("1k6/8/8/8/8/1r6/7r/K7 w - - 0 1").unwrap();
        assert!(board.is_stalemate());

        //checkmate
        let board = ChessBoard::from_fen("1k6/8/8/8/8/8/PPn5/KN6 w - - 0 1").unwrap();
        assert!(!board.is_stalemate());
    }

    #[test]
    fn test_make_move_promotion() {
        let mut board = ChessBoard::from_fen("k7/2P5/1p6/8/8/p7/PP6/7K w - - 0 1").unwrap();
        play(&mut board, "c7c8q");
        assert_eq!(board.piece_at(field("c8")), Some(Piece::new(Color::White, PieceType::Queen)));
        assert_eq!(board.piece_at(field("c7")), None);
    }

    #[test]
    fn test_make_move_capture_rook_invalidates_castling() {
        let mut board = ChessBoard::from_fen("rnbq1k1r/pp1Pbppp/2p5/8/2B5/P7/1PP1NnPP/RNBQK2R b KQ - 0 8").unwrap();
        play(&mut board, "f2h1");
        assert!(!board.castling_rights.has(Color::White, CastlingSide::Kingside));
        assert!(board.castling_rights.has(Color::White, CastlingSide::Queenside));
    }

    #[test]
    fn test_make_move_castling() {
        let mut board = ChessBoard::from_fen("rnbqk2r/ppp2pbp/3p1np1/4p3/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        play(&mut board, "e1g1");
        assert_eq!(board.piece_at(field("g1")), Some(Piece::new(Color::White, PieceType::King)));
        assert_eq!(board.piece_at(field("f1")), Some(Piece::new(Color::White, PieceType::Rook)));
        assert_eq!(board.piece_at(field("h1")), None);
        assert_eq!(board.castling_rights.flags(), [false, false, true, true]);
        assert_eq!(board.en_passant, None);

        let mut board = ChessBoard::from_fen("rnbqk2r/ppp2pbp/3p1np1/4p3/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        play(&mut board, "e1c1");
        assert_eq!(board.piece_at(field("c1")), Some(Piece::new(Color::White, PieceType::King)));
        assert_eq!(board.piece_at(field("d1")), Some(Piece::new(Color::White, PieceType::Rook)));
        assert_eq!(board.piece_at(field("a1")), None);
        assert_eq!(board.castling_rights.flags(), [false, false, true, true]);

        let mut board = ChessBoard::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R b KQkq - 0 1").unwrap();
        play(&mut board, "e8g8");
        assert_eq!(board.piece_at(field("g8")), Some(Piece::new(Color::Black, PieceType::King)));
        assert_eq!(board.piece_at(field("f8")), Some(Piece::new(Color::Black, PieceType::Rook)));
        assert_eq!(board.castling_rights.flags(), [true, true, false, false]);

        let mut board = ChessBoard::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R b KQkq - 0 1").unwrap();
        play(&mut board, "e8c8");
        assert_eq!(board.piece_at(field("c8")), Some(Piece::new(Color::Black, PieceType::King)));
        assert_eq!(board.piece_at(field("d8")), Some(Piece::new(Color::Black, PieceType::Rook)));
        assert_eq!(board.castling_rights.flags(), [true, true, false, false]);
    }

    #[test]
    fn test_rook_and_king_moves_revoke_castling() {
        let mut board = ChessBoard::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        play(&mut board, "a1b1");
        assert_eq!(board.castling_rights.flags(), [true, false, true, true]);
        play(&mut board, "a8b8");
        assert_eq!(board.castling_rights.flags(), [true, false, true, false]);
        play(&mut board, "h1g1");
        assert_eq!(board.castling_rights.flags(), [false, false, true, false]);
        play(&mut board, "e8d8");
        assert_eq!(board.castling_rights, CastlingRights::NONE);
    }

    #[test]
    fn test_en_passant_target_lifecycle() {
        let mut board = ChessBoard::starting_position();
        play(&mut board, "e2e4");
        assert_eq!(board.en_passant, Some(field("e3")));
        play(&mut board, "g8f6");
        assert_eq!(board.en_passant, None);
        play(&mut board, "e4e5");
        play(&mut board, "d7d5");
        assert_eq!(board.en_passant, Some(field("d6")));
        assert!(board.en_passant_capturable());
        play(&mut board, "e5d6");
        assert_eq!(board.piece_at(field("d5")), None);
        assert_eq!(board.piece_at(field("d6")), Some(Piece::new(Color::White, PieceType::Pawn)));
        assert_eq!(board.halfmove_clock, 0);
    }

    #[test]
    fn test_pinned_pawn_cannot_use_en_passant() {
        // exd6 would clear the fifth rank between the rook and the king
        let pinned = ChessBoard::from_fen("4k3/8/8/K2pP2r/8/8/8/8 w - d6 0 1").unwrap();
        assert!(!pinned.en_passant_capturable());
        let without_target = ChessBoard::from_fen("4k3/8/8/K2pP2r/8/8/8/8 w - - 0 1").unwrap();
        assert_eq!(pinned.hash, without_target.hash);

        let free = ChessBoard::from_fen("4k3/8/8/K2pP3/7r/8/8/8 w - d6 0 1").unwrap();
        assert!(free.en_passant_capturable());
    }

    #[test]
    fn test_clocks() {
        let mut board = ChessBoard::starting_position();
        play(&mut board, "g1f3");
        assert_eq!(board.halfmove_clock, 1);
        assert_eq!(board.fullmove_number, 1);
        play(&mut board, "g8f6");
        assert_eq!(board.halfmove_clock, 2);
        assert_eq!(board.fullmove_number, 2);
        play(&mut board, "e2e4");
        assert_eq!(board.halfmove_clock, 0);
    }

    #[test]
    fn test_clocks_at_the_import_limit() {
        let mut board = ChessBoard::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 65535 65535").unwrap();
        play(&mut board, "e8d8");
        assert_eq!(board.halfmove_clock, 65536);
        assert_eq!(board.fullmove_number, 65536);

        assert!(matches!(
            ChessBoard::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 4294967295"),
            Err(FenError::Counter { .. })
        ));
        assert!(matches!(
            ChessBoard::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 4294967295 1"),
            Err(FenError::Counter { .. })
        ));

        let mut saturated = board.clone();
        saturated.halfmove_clock = u32::MAX;
        saturated.fullmove_number = u32::MAX;
        play(&mut saturated, "a1a2");
        play(&mut saturated, "d8e8");
        assert_eq!(saturated.halfmove_clock, u32::MAX);
        assert_eq!(saturated.fullmove_number, u32::MAX);
    }

    #[test]
    fn test_render_to_string() {
        let rendered = ChessBoard::starting_position().render_to_string();
        assert!(rendered.contains("8 │ r │ n │ b │ q │ k │ b │ n │ r │ 8"));
        assert!(rendered.contains("1 │ R │ N │ B │ Q │ K │ B │ N │ R │ 1"));
    }
}
