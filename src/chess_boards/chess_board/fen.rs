use super::ChessBoard;
use super::{CastlingRights, ChessField, Color, Piece, Square};
use crate::error::FenError;

pub const INITIAL_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Largest clock value accepted on import, so the counters never overflow in play.
const MAX_COUNTER: u32 = u16::MAX as u32;

/// Parses a FEN string into a board without checking that the position is reachable.
pub fn from_fen(fen: &str) -> Result<ChessBoard, FenError> {
    let mut board = ChessBoard::empty();
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() != 6 {
        return Err(FenError::FieldCount(parts.len()));
    }

    // Parse board squares
    let rows: Vec<&str> = parts[0].split('/').collect();
    if rows.len() != 8 {
        return Err(FenError::RankCount(rows.len()));
    }

    for (row_index, row) in rows.iter().enumerate() {
        let mut col_index = 0usize;

        for c in row.chars() {
            if let Some(skip) = c.to_digit(10) {
                col_index += skip as usize;
            } else {
                let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece(c))?;
                if col_index > 7 {
                    return Err(FenError::RankLength {
                        rank: 8 - row_index,
                        files: col_index + 1,
                    });
                }
                board.squares[7 - row_index][col_index] = Square::Occupied(piece);
                col_index += 1;
            }
        }
        if col_index != 8 {
            return Err(FenError::RankLength {
                rank: 8 - row_index,
                files: col_index,
            });
        }
    }

    board.active_color = match parts[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::ActiveColor(other.to_string())),
    };

    board.castling_rights = parse_castling(parts[2])?;

    board.en_passant = if parts[3] == "-" {
        None
    } else {
        let square = ChessField::from_algebraic(parts[3]).ok_or_else(|| FenError::EnPassant(parts[3].to_string()))?;
        if square.row != 2 && square.row != 5 {
            return Err(FenError::EnPassant(parts[3].to_string()));
        }
        Some(square)
    };

    board.halfmove_clock = parts[4]
        .parse::<u32>()
        .ok()
        .filter(|n| *n <= MAX_COUNTER)
        .ok_or_else(|| FenError::Counter {
            field: "halfmove clock",
            value: parts[4].to_string(),
        })?;

    board.fullmove_number = parts[5]
        .parse::<u32>()
        .ok()
        .filter(|n| (1..=MAX_COUNTER).contains(n))
        .ok_or_else(|| FenError::Counter {
            field: "fullmove number",
            value: parts[5].to_string(),
        })?;

    Ok(board)
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    if field == "-" {
        return Ok(CastlingRights::NONE);
    }
    let mut flags = [false; 4];
    for c in field.chars() {
        let slot = match c {
            'K' => 0,
            'Q' => 1,
            'k' => 2,
            'q' => 3,
            _ => return Err(FenError::Castling(field.to_string())),
        };
        if flags[slot] {
            return Err(FenError::Castling(field.to_string()));
        }
        flags[slot] = true;
    }
    Ok(CastlingRights::from_flags(flags))
}

pub fn to_fen(board: &ChessBoard) -> String {
    let mut board_representation = String::new();

    for rank in (0..8).rev() {
        let mut empty_count = 0;

        for file in 0..8 {
            match board.squares[rank][file] {
                Square::Occupied(piece) => {
                    if empty_count > 0 {
                        board_representation.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    board_representation.push(piece.to_char());
                }
                Square::Empty => {
                    empty_count += 1;
                }
            }
        }

        if empty_count > 0 {
            board_representation.push_str(&empty_count.to_string());
        }

        if rank > 0 {
            board_representation.push('/');
        }
    }

    let active_color = if board.active_color == Color::White { "w" } else { "b" };

    let mut castling: String = "KQkq"
        .chars()
        .zip(board.castling_rights.flags())
        .filter(|(_, held)| *held)
        .map(|(c, _)| c)
        .collect();
    if castling.is_empty() {
        castling = "-".to_string();
    }

    let en_passant_square = match board.en_passant {
        Some(square) => square.as_algebraic(),
        None => "-".to_string(),
    };

    format!(
        "{} {} {} {} {} {}",
        board_representation, active_color, castling, en_passant_square, board.halfmove_clock, board.fullmove_number
    )
}
