use super::{CastlingSide, ChessBoard, ChessField, Move, Piece, PieceType, SpecialMove};

const KNIGHT_MOVES: [(i8, i8); 8] = [(-2, -1), (-1, -2), (1, -2), (2, -1), (2, 1), (1, 2), (-1, 2), (-2, 1)];
const KING_MOVES: [(i8, i8); 8] = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
const QUEEN_DIRECTIONS: [(i8, i8); 8] = [(-1, -1), (-1, 1), (1, -1), (1, 1), (0, -1), (0, 1), (-1, 0), (1, 0)];

/// Lazily walks the board and yields the pseudo legal moves of the side to move.
///
/// Moves of one piece are generated at a time, so consumers that stop early
/// (e.g. "is there any legal move at all?") never pay for the whole list.
pub struct PseudoLegalMoves<'a> {
    board: &'a ChessBoard,
    next_field: u8,
    pending: Vec<Move>,
}

impl Iterator for PseudoLegalMoves<'_> {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        loop {
            if let Some(mv) = self.pending.pop() {
                return Some(mv);
            }
            if self.next_field >= 64 {
                return None;
            }
            let field = ChessField::new(self.next_field / 8, self.next_field % 8);
            self.next_field += 1;
            self.board.generate_pseudo_moves_from_field(field, &mut self.pending);
            // pending is used as a stack
            self.pending.reverse();
        }
    }
}

impl ChessBoard {
    pub fn pseudo_legal_moves(&self) -> PseudoLegalMoves<'_> {
        PseudoLegalMoves {
            board: self,
            next_field: 0,
            pending: Vec::with_capacity(28),
        }
    }

    /// Appends the pseudo legal moves of the piece on `field`, if it belongs to the side to move.
    pub fn generate_pseudo_moves_from_field(&self, field: ChessField, moves: &mut Vec<Move>) {
        let Some(piece) = self.piece_at(field) else {
            return;
        };
        if piece.color != self.active_color {
            return;
        }
        match piece.kind {
            PieceType::Pawn => self.generate_pawn_moves(field, moves),
            PieceType::Knight => self.generate_moves_from_directions(field, PieceType::Knight, &KNIGHT_MOVES, moves),
            PieceType::Bishop => self.generate_sliding_moves(field, PieceType::Bishop, &BISHOP_DIRECTIONS, moves),
            PieceType::Rook => self.generate_sliding_moves(field, PieceType::Rook, &ROOK_DIRECTIONS, moves),
            PieceType::Queen => self.generate_sliding_moves(field, PieceType::Queen, &QUEEN_DIRECTIONS, moves),
            PieceType::King => {
                self.generate_moves_from_directions(field, PieceType::King, &KING_MOVES, moves);
                self.generate_castling_moves(field, moves);
            }
        }
    }

    fn generate_pawn_moves(&self, field: ChessField, moves: &mut Vec<Move>) {
        let color = self.active_color;
        let forward = color.forward();
        let promotion_row = color.promotion_row();

        let Some(one_forward) = field.offset(forward, 0) else {
            return;
        };

        // Regular forward move
        if self.piece_at(one_forward).is_none() {
            Self::add_pawn_moves_with_and_without_promotion(
                Move::new(PieceType::Pawn, field, one_forward),
                promotion_row,
                moves,
            );

            // Double move from start position
            if field.row == color.pawn_start_row() {
                if let Some(two_forward) = field.offset(2 * forward, 0) {
                    if self.piece_at(two_forward).is_none() {
                        moves.push(Move::new(PieceType::Pawn, field, two_forward));
                    }
                }
            }
        }

        // Capture diagonally
        for dx in [-1, 1] {
            let Some(target) = field.offset(forward, dx) else {
                continue;
            };
            if let Some(opponent_piece) = self.piece_at(target) {
                if opponent_piece.color != color {
                    let mv = Move::new(PieceType::Pawn, field, target).with_capture(opponent_piece.kind);
                    Self::add_pawn_moves_with_and_without_promotion(mv, promotion_row, moves);
                }
            } else if self.en_passant == Some(target) {
                moves.push(
                    Move::new(PieceType::Pawn, field, target)
                        .with_capture(PieceType::Pawn)
                        .with_special(SpecialMove::EnPassant),
                );
            }
        }
    }

    fn add_pawn_moves_with_and_without_promotion(mv: Move, promotion_row: u8, moves: &mut Vec<Move>) {
        if mv.to.row == promotion_row {
            for promotion_piece in PieceType::PROMOTIONS {
                moves.push(mv.with_promotion(promotion_piece));
            }
        } else {
            moves.push(mv);
        }
    }

    /// Generate sliding piece moves (bishop, rook, queen).
    fn generate_sliding_moves(&self, field: ChessField, kind: PieceType, directions: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(dx, dy) in directions {
            let mut current = field;
            while let Some(next) = current.offset(dx, dy) {
                current = next;
                match self.piece_at(current) {
                    None => moves.push(Move::new(kind, field, current)),
                    Some(p) => {
                        if p.color != self.active_color {
                            moves.push(Move::new(kind, field, current).with_capture(p.kind));
                        }
                        break; // Block sliding
                    }
                }
            }
        }
    }

    fn generate_moves_from_directions(
        &self,
        field: ChessField,
        kind: PieceType,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(dx, dy) in directions {
            let Some(target) = field.offset(dx, dy) else {
                continue;
            };
            match self.piece_at(target) {
                None => moves.push(Move::new(kind, field, target)),
                Some(p) if p.color != self.active_color => moves.push(Move::new(kind, field, target).with_capture(p.kind)),
                Some(_) => {}
            }
        }
    }

    /// Castling needs the right, the rook on its corner, empty squares in between
    /// and a king that neither starts on nor passes through an attacked square.
    fn generate_castling_moves(&self, field: ChessField, moves: &mut Vec<Move>) {
        let color = self.active_color;
        let row = color.back_row();
        if field != ChessField::new(row, 4) {
            return;
        }

        for side in [CastlingSide::Kingside, CastlingSide::Queenside] {
            if !self.castling_rights.has(color, side) {
                continue;
            }
            let rook_home = ChessField::new(row, side.rook_from_col());
            if self.piece_at(rook_home) != Some(Piece::new(color, PieceType::Rook)) {
                continue;
            }

            let (between, king_path): (&[u8], &[u8]) = match side {
                CastlingSide::Kingside => (&[5, 6], &[4, 5, 6]),
                CastlingSide::Queenside => (&[1, 2, 3], &[4, 3, 2]),
            };
            let clear = between.iter().all(|&col| self.piece_at(ChessField::new(row, col)).is_none());
            let safe = clear && king_path.iter().all(|&col| !self.is_square_attacked(ChessField::new(row, col)));
            if safe {
                moves.push(
                    Move::new(PieceType::King, field, ChessField::new(row, side.king_to_col()))
                        .with_special(SpecialMove::Castle(side)),
                );
            }
        }
    }

    /// True if the move, taken from this position's generator, does not leave the mover's king attacked.
    pub fn is_legal(&self, mv: &Move) -> bool {
        let mut board_clone = self.clone();
        board_clone.apply_move(*mv);
        !board_clone.is_in_check(self.active_color)
    }

    pub fn legal_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.pseudo_legal_moves().filter(move |mv| self.is_legal(mv))
    }

    pub fn legal_moves_from(&self, field: ChessField) -> Vec<Move> {
        let mut moves = Vec::new();
        self.generate_pseudo_moves_from_field(field, &mut moves);
        moves.retain(|mv| self.is_legal(mv));
        moves
    }

    pub fn has_legal_move(&self) -> bool {
        self.legal_moves().next().is_some()
    }
}
