//! Standard algebraic notation.
//!
//! Parsing resolves text against the legal moves of a position and never
//! picks one of several candidates. Formatting produces the shortest
//! unambiguous form with check and mate suffixes.

use super::{model::parse_coordinate_move, CastlingSide, ChessBoard, ChessField, Move, PieceType};
use crate::config::NotationMode;
use crate::error::MoveError;

/// What the text of a SAN move says, before it is matched against a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SanPattern {
    piece: PieceType,
    from_file: Option<u8>,
    from_rank: Option<u8>,
    capture: bool,
    to: ChessField,
    promotion: Option<PieceType>,
}

impl SanPattern {
    fn matches(&self, mv: &Move) -> bool {
        mv.piece == self.piece
            && mv.to == self.to
            && mv.castling_side().is_none()
            && self.from_file.map_or(true, |f| mv.from.col == f)
            && self.from_rank.map_or(true, |r| mv.from.row == r)
            // a pawn named without its file can only push straight ahead
            && (self.piece != PieceType::Pawn || self.from_file.is_some() || mv.from.col == self.to.col)
    }
}

/// Resolves `input` to the single legal move it denotes in `board`.
pub fn parse_san(board: &ChessBoard, input: &str, mode: NotationMode) -> Result<Move, MoveError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(malformed(input, "empty move"));
    }

    let (body, suffix) = split_suffix(text, mode);
    if body.is_empty() {
        return Err(malformed(input, "no move before the suffix"));
    }

    if mode == NotationMode::Lenient {
        if let Some(mv) = resolve_coordinates(board, input, body)? {
            return Ok(mv);
        }
    }

    let (mv, capture) = if let Some(side) = castling_side(body, mode) {
        let mv = board
            .legal_moves()
            .find(|m| m.castling_side() == Some(side))
            .ok_or_else(|| illegal(input, format!("{} is not available", side.san())))?;
        (mv, false)
    } else {
        let pattern = tokenize(body, mode).ok_or_else(|| malformed(input, "not algebraic notation"))?;
        (resolve_pattern(board, input, &pattern)?, pattern.capture)
    };

    if mode == NotationMode::Strict {
        if mv.castling_side().is_none() && capture != mv.is_capture() {
            return Err(illegal(input, "capture marker does not match the move".to_string()));
        }
        let expected = check_suffix(board, &mv);
        if suffix != expected {
            return Err(illegal(input, format!("expected check suffix '{}'", expected)));
        }
    }

    Ok(mv)
}

/// Formats a legal move of `board` in SAN.
pub fn to_san(board: &ChessBoard, mv: &Move) -> String {
    let mut san = String::new();

    if let Some(side) = mv.castling_side() {
        san.push_str(side.san());
    } else {
        match mv.piece.san_letter() {
            Some(letter) => {
                san.push(letter);
                san.push_str(&disambiguation(board, mv));
            }
            None if mv.is_capture() => san.push(mv.from.file_char()),
            None => {}
        }
        if mv.is_capture() {
            san.push('x');
        }
        san.push_str(&mv.to.as_algebraic());
        if let Some(promotion) = mv.promotion {
            san.push('=');
            san.push_str(&promotion.to_string());
        }
    }

    san.push_str(check_suffix(board, mv));
    san
}

/// All legal moves of the side to move, in SAN.
pub fn legal_sans(board: &ChessBoard) -> Vec<String> {
    board.legal_moves().map(|mv| to_san(board, &mv)).collect()
}

fn disambiguation(board: &ChessBoard, mv: &Move) -> String {
    let rivals: Vec<ChessField> = board
        .legal_moves()
        .filter(|other| other.piece == mv.piece && other.to == mv.to && other.from != mv.from)
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|f| f.col != mv.from.col) {
        mv.from.file_char().to_string()
    } else if rivals.iter().all(|f| f.row != mv.from.row) {
        mv.from.rank_char().to_string()
    } else {
        mv.from.as_algebraic()
    }
}

fn check_suffix(board: &ChessBoard, mv: &Move) -> &'static str {
    let mut after = board.clone();
    after.apply_move(*mv);
    if !after.is_check() {
        ""
    } else if after.has_legal_move() {
        "+"
    } else {
        "#"
    }
}

fn split_suffix(text: &str, mode: NotationMode) -> (&str, &str) {
    let trimmed = match mode {
        // annotation glyphs carry no move information
        NotationMode::Lenient => text.trim_end_matches(['!', '?']),
        NotationMode::Strict => text,
    };
    let body = trimmed.trim_end_matches(['+', '#']);
    (body, &trimmed[body.len()..])
}

fn castling_side(body: &str, mode: NotationMode) -> Option<CastlingSide> {
    match (body, mode) {
        ("O-O", _) => Some(CastlingSide::Kingside),
        ("O-O-O", _) => Some(CastlingSide::Queenside),
        ("0-0", NotationMode::Lenient) => Some(CastlingSide::Kingside),
        ("0-0-0", NotationMode::Lenient) => Some(CastlingSide::Queenside),
        _ => None,
    }
}

fn tokenize(body: &str, mode: NotationMode) -> Option<SanPattern> {
    let mut chars: Vec<char> = body.chars().collect();

    let mut promotion = None;
    let len = chars.len();
    if len >= 2 && chars[len - 2] == '=' {
        promotion = Some(PieceType::from_promotion_char(chars[len - 1])?);
        chars.truncate(len - 2);
    } else if mode == NotationMode::Lenient && len >= 3 && chars[len - 2].is_ascii_digit() && chars[len - 1].is_alphabetic()
    {
        promotion = Some(PieceType::from_promotion_char(chars[len - 1])?);
        chars.truncate(len - 1);
    }

    let piece = match chars.first().and_then(|c| PieceType::from_san_letter(*c)) {
        Some(kind) => {
            chars.remove(0);
            kind
        }
        None => PieceType::Pawn,
    };

    let rank = chars.pop()?;
    let file = chars.pop()?;
    let to = ChessField::from_algebraic(&format!("{}{}", file, rank))?;

    let capture = match chars.last() {
        Some('x') => true,
        Some(':') if mode == NotationMode::Lenient => true,
        _ => false,
    };
    if capture {
        chars.pop();
    }

    let (from_file, from_rank) = match chars.as_slice() {
        [] => (None, None),
        [f] if ('a'..='h').contains(f) => (Some(*f as u8 - b'a'), None),
        [r] if ('1'..='8').contains(r) => (None, Some(*r as u8 - b'1')),
        [f, r] => {
            let from = ChessField::from_algebraic(&format!("{}{}", f, r))?;
            (Some(from.col), Some(from.row))
        }
        _ => return None,
    };

    Some(SanPattern {
        piece,
        from_file,
        from_rank,
        capture,
        to,
        promotion,
    })
}

fn resolve_pattern(board: &ChessBoard, input: &str, pattern: &SanPattern) -> Result<Move, MoveError> {
    let reachable: Vec<Move> = board.legal_moves().filter(|mv| pattern.matches(mv)).collect();
    let candidates: Vec<Move> = reachable
        .iter()
        .filter(|mv| mv.promotion == pattern.promotion)
        .copied()
        .collect();

    match candidates.as_slice() {
        [mv] => Ok(*mv),
        [] if pattern.promotion.is_none() && reachable.iter().any(|mv| mv.promotion.is_some()) => {
            Err(illegal(input, "promotion piece required".to_string()))
        }
        [] if pattern.promotion.is_some() && !reachable.is_empty() => {
            Err(illegal(input, "this move does not promote".to_string()))
        }
        [] => Err(illegal(input, describe_miss(board, pattern))),
        several => Err(MoveError::Ambiguous {
            input: input.to_string(),
            candidates: several.iter().map(|mv| to_san(board, mv)).collect(),
        }),
    }
}

fn describe_miss(board: &ChessBoard, pattern: &SanPattern) -> String {
    let piece = match pattern.piece {
        PieceType::Pawn => "pawn",
        PieceType::Knight => "knight",
        PieceType::Bishop => "bishop",
        PieceType::Rook => "rook",
        PieceType::Queen => "queen",
        PieceType::King => "king",
    };
    if board.is_check() {
        format!("no {} move to {} resolves the check", piece, pattern.to)
    } else {
        format!("no {} can legally move to {}", piece, pattern.to)
    }
}

fn resolve_coordinates(board: &ChessBoard, input: &str, body: &str) -> Result<Option<Move>, MoveError> {
    let Some((from, to, promotion)) = parse_coordinate_move(body) else {
        return Ok(None);
    };
    let reachable: Vec<Move> = board.legal_moves().filter(|mv| mv.from == from && mv.to == to).collect();
    if reachable.is_empty() {
        return match board.piece_at(from) {
            Some(piece) if piece.color == board.active_color => {
                Err(illegal(input, format!("the piece on {} cannot move to {}", from, to)))
            }
            Some(_) => Err(illegal(input, format!("the piece on {} belongs to the opponent", from))),
            None => Err(illegal(input, format!("there is no piece on {}", from))),
        };
    }
    match reachable.iter().find(|mv| mv.promotion == promotion) {
        Some(mv) => Ok(Some(*mv)),
        None if promotion.is_none() => Err(illegal(input, "promotion piece required".to_string())),
        None => Err(illegal(input, "this move does not promote".to_string())),
    }
}

fn malformed(input: &str, reason: &'static str) -> MoveError {
    MoveError::Malformed {
        input: input.to_string(),
        reason,
    }
}

fn illegal(input: &str, reason: String) -> MoveError {
    MoveError::Illegal {
        input: input.to_string(),
        reason,
    }
}
