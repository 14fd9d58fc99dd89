use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single pawn push.
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row holding the king and rooks at the start of the game.
    pub fn back_row(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn pawn_start_row(&self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn promotion_row(&self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub const PROMOTIONS: [PieceType; 4] = [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight];

    /// Letter used in SAN; pawns have none.
    pub fn san_letter(&self) -> Option<char> {
        match self {
            PieceType::Pawn => None,
            other => other.to_string().chars().next(),
        }
    }

    pub fn from_san_letter(letter: char) -> Option<Self> {
        match letter {
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Promotion suffix of coordinate notation, either case.
    pub fn from_promotion_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'Q' => Some(PieceType::Queen),
            'R' => Some(PieceType::Rook),
            'B' => Some(PieceType::Bishop),
            'N' => Some(PieceType::Knight),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            PieceType::Pawn => 0,
            PieceType::Knight => 1,
            PieceType::Bishop => 2,
            PieceType::Rook => 3,
            PieceType::Queen => 4,
            PieceType::King => 5,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "P"),
            PieceType::Knight => write!(f, "N"),
            PieceType::Bishop => write!(f, "B"),
            PieceType::Rook => write!(f, "R"),
            PieceType::Queen => write!(f, "Q"),
            PieceType::King => write!(f, "K"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Square {
    Occupied(Piece),
    Empty,
}

impl Square {
    pub fn piece(&self) -> Option<Piece> {
        match self {
            Square::Occupied(piece) => Some(*piece),
            Square::Empty => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct ChessField {
    pub row: u8,
    pub col: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CastlingSide {
    Kingside,
    Queenside,
}

impl CastlingSide {
    pub fn king_to_col(&self) -> u8 {
        match self {
            CastlingSide::Kingside => 6,
            CastlingSide::Queenside => 2,
        }
    }

    pub fn rook_from_col(&self) -> u8 {
        match self {
            CastlingSide::Kingside => 7,
            CastlingSide::Queenside => 0,
        }
    }

    pub fn rook_to_col(&self) -> u8 {
        match self {
            CastlingSide::Kingside => 5,
            CastlingSide::Queenside => 3,
        }
    }

    pub fn san(&self) -> &'static str {
        match self {
            CastlingSide::Kingside => "O-O",
            CastlingSide::Queenside => "O-O-O",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecialMove {
    Castle(CastlingSide),
    EnPassant,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct Move {
    pub from: ChessField,
    pub to: ChessField,
    pub piece: PieceType,
    pub captured: Option<PieceType>,
    pub promotion: Option<PieceType>,
    pub special: Option<SpecialMove>,
}

/// Castling availability, indexed white kingside, white queenside, black kingside, black queenside.
///
/// There is no way to grant a right once the position exists; moves only revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights([bool; 4]);

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights([true; 4]);
    pub const NONE: CastlingRights = CastlingRights([false; 4]);

    pub(crate) fn slot(color: Color, side: CastlingSide) -> usize {
        match (color, side) {
            (Color::White, CastlingSide::Kingside) => 0,
            (Color::White, CastlingSide::Queenside) => 1,
            (Color::Black, CastlingSide::Kingside) => 2,
            (Color::Black, CastlingSide::Queenside) => 3,
        }
    }

    pub(crate) fn from_flags(flags: [bool; 4]) -> Self {
        CastlingRights(flags)
    }

    pub fn has(&self, color: Color, side: CastlingSide) -> bool {
        self.0[Self::slot(color, side)]
    }

    pub fn revoke(&mut self, color: Color, side: CastlingSide) {
        self.0[Self::slot(color, side)] = false;
    }

    pub fn revoke_all(&mut self, color: Color) {
        self.revoke(color, CastlingSide::Kingside);
        self.revoke(color, CastlingSide::Queenside);
    }

    pub fn flags(&self) -> [bool; 4] {
        self.0
    }

    /// True when every right held here is also held by `other`.
    pub fn is_subset_of(&self, other: &CastlingRights) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(mine, theirs)| !*mine || *theirs)
    }
}

impl Piece {
    pub fn new(color: Color, kind: PieceType) -> Self {
        Self { color, kind }
    }

    pub fn to_char(&self) -> char {
        let c = self.kind.to_string().chars().next().unwrap_or('?');
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        Some(Self { color, kind })
    }
}

impl ChessField {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn from_algebraic(algebraic: &str) -> Option<Self> {
        let mut chars = algebraic.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Some(Self {
            row: rank as u8 - b'1',
            col: file as u8 - b'a',
        })
    }

    pub fn as_algebraic(&self) -> String {
        to_algebraic_square(self.row, self.col)
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.col) as char
    }

    pub fn rank_char(&self) -> char {
        (b'1' + self.row) as char
    }

    /// Square shifted by the given deltas, if it is still on the board.
    pub fn offset(&self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    pub fn is_light(&self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    pub fn all() -> impl Iterator<Item = ChessField> {
        (0..64u8).map(|i| ChessField::new(i / 8, i % 8))
    }
}

impl fmt::Display for ChessField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl Move {
    pub fn new(piece: PieceType, from: ChessField, to: ChessField) -> Self {
        Self {
            from,
            to,
            piece,
            captured: None,
            promotion: None,
            special: None,
        }
    }

    pub fn with_capture(mut self, captured: PieceType) -> Self {
        self.captured = Some(captured);
        self
    }

    pub fn with_promotion(mut self, promotion: PieceType) -> Self {
        self.promotion = Some(promotion);
        self
    }

    pub fn with_special(mut self, special: SpecialMove) -> Self {
        self.special = Some(special);
        self
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn castling_side(&self) -> Option<CastlingSide> {
        match self.special {
            Some(SpecialMove::Castle(side)) => Some(side),
            _ => None,
        }
    }

    /// Coordinate notation as spoken by UCI engines, e.g. `e2e4` or `e7e8q`.
    pub fn as_algebraic(&self) -> String {
        let base_move = format!(
            "{}{}",
            to_algebraic_square(self.from.row, self.from.col),
            to_algebraic_square(self.to.row, self.to.col)
        );
        if let Some(promo) = self.promotion {
            base_move + &promo.to_string().to_lowercase()
        } else {
            base_move
        }
    }
}

/// Splits coordinate notation into origin, destination and promotion piece.
pub fn parse_coordinate_move(algebraic: &str) -> Option<(ChessField, ChessField, Option<PieceType>)> {
    if !algebraic.is_ascii() || !(4..=5).contains(&algebraic.len()) {
        return None;
    }
    let from = ChessField::from_algebraic(&algebraic[0..2])?;
    let to = ChessField::from_algebraic(&algebraic[2..4])?;

    let promotion = match algebraic.chars().nth(4) {
        Some(c) => Some(PieceType::from_promotion_char(c)?),
        None => None,
    };
    Some((from, to, promotion))
}

pub fn to_algebraic_square(row: u8, col: u8) -> String {
    let file = (b'a' + col) as char;
    let rank = (row + 1).to_string();
    format!("{}{}", file, rank)
}
