use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::chess_boards::chess_board::Color;

/// How forgiving move parsing is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotationMode {
    /// Accepts a missing or superfluous capture marker, a wrong or missing
    /// check suffix, `0-0` castling, `e8Q` promotions and coordinate moves.
    #[default]
    Lenient,
    /// Standard algebraic notation exactly as the position dictates.
    Strict,
}

/// Configuration for a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Side played by the human. Default: White.
    /// With Black the external mover opens the game.
    pub human_color: Color,
    /// Upper bound for one external mover round-trip. Default: 30s.
    pub reply_timeout: Duration,
    /// Notation accepted from both the human and the external mover. Default: lenient.
    pub notation: NotationMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            human_color: Color::White,
            reply_timeout: Duration::from_secs(30),
            notation: NotationMode::Lenient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.human_color, Color::White);
        assert_eq!(config.reply_timeout, Duration::from_secs(30));
        assert_eq!(config.notation, NotationMode::Lenient);
    }
}
