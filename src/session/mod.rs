//! The game session: one game between a human and an external mover.
//!
//! ```text
//! AwaitingHumanMove --valid human move--> AwaitingReply --legal reply--> AwaitingHumanMove
//!        |                                     |
//!        +------- game ends -----> Terminal <--+
//! ```
//!
//! Rejected moves and failed replies leave the session exactly as it was.
//! `Terminal` only ends with [`GameSession::reset`].

use serde::Serialize;
use std::fmt;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::chess_boards::chess_board::{legal_sans, parse_san, ChessBoard, Move, Termination};
use crate::config::SessionConfig;
use crate::error::{FenError, OracleFailure, SessionError, SessionResult};
use crate::history::GameHistory;
use crate::movers::ExternalMover;

mod summary;

pub use summary::{AcceptedMove, GameStatus, PositionSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    AwaitingHumanMove,
    AwaitingReply,
    Terminal(Termination),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::AwaitingHumanMove => write!(f, "awaiting the human move"),
            SessionState::AwaitingReply => write!(f, "awaiting the reply"),
            SessionState::Terminal(termination) => write!(f, "game over by {}", termination),
        }
    }
}

pub struct GameSession<M: ExternalMover> {
    config: SessionConfig,
    history: GameHistory,
    state: SessionState,
    mover: M,
}

impl<M: ExternalMover> GameSession<M> {
    /// Starts a game from the initial position.
    pub fn new(mover: M, config: SessionConfig) -> Self {
        Self::from_history(mover, config, GameHistory::default())
    }

    /// Starts a game from a FEN position.
    pub fn with_start_fen(mover: M, config: SessionConfig, fen: &str) -> Result<Self, FenError> {
        let start = ChessBoard::from_fen(fen)?;
        Ok(Self::from_history(mover, config, GameHistory::new(start)))
    }

    /// Resumes a game from its moves, played from the initial position.
    ///
    /// A move list that does not replay is a corrupted history and no session is created.
    pub fn from_moves<S: AsRef<str>>(mover: M, config: SessionConfig, moves: &[S]) -> SessionResult<Self> {
        let history = GameHistory::replay(ChessBoard::starting_position(), moves, config.notation)?;
        Ok(Self::from_history(mover, config, history))
    }

    fn from_history(mover: M, config: SessionConfig, history: GameHistory) -> Self {
        let mut session = Self {
            config,
            history,
            state: SessionState::AwaitingHumanMove,
            mover,
        };
        session.state = session.derive_state();
        session
    }

    fn derive_state(&self) -> SessionState {
        if let Some(termination) = self.history.termination() {
            SessionState::Terminal(termination)
        } else if self.history.current().active_color == self.config.human_color {
            SessionState::AwaitingHumanMove
        } else {
            SessionState::AwaitingReply
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn history(&self) -> &GameHistory {
        &self.history
    }

    pub fn board(&self) -> &ChessBoard {
        self.history.current()
    }

    pub fn mover(&self) -> &M {
        &self.mover
    }

    /// Ends the session and hands the mover back, for example to shut it down.
    pub fn into_mover(self) -> M {
        self.mover
    }

    /// Validates and plays the human's move.
    pub fn apply_human_move(&mut self, input: &str) -> SessionResult<AcceptedMove> {
        match self.state {
            SessionState::AwaitingHumanMove => {}
            SessionState::Terminal(termination) => return Err(SessionError::GameOver(termination)),
            state @ SessionState::AwaitingReply => return Err(SessionError::OutOfTurn { state }),
        }

        let mv = parse_san(self.board(), input, self.config.notation).map_err(|error| {
            info!(input, %error, "human move rejected");
            error
        })?;
        Ok(self.accept(mv, "human"))
    }

    /// Asks the external mover for its reply and plays it if it is legal.
    ///
    /// On any failure, including the timeout, the session keeps waiting for a
    /// reply and the request can be repeated. Dropping the returned future
    /// before it completes leaves the session unchanged as well.
    pub async fn request_reply(&mut self) -> SessionResult<AcceptedMove> {
        match self.state {
            SessionState::AwaitingReply => {}
            SessionState::Terminal(termination) => return Err(SessionError::GameOver(termination)),
            state @ SessionState::AwaitingHumanMove => return Err(SessionError::OutOfTurn { state }),
        }

        let moves = self.history.sans();
        let limit = self.config.reply_timeout;
        let outcome = timeout(limit, self.mover.propose(&moves)).await;
        let candidate = match outcome {
            Err(_) => {
                warn!(mover = self.mover.name(), ?limit, "external mover timed out");
                return Err(OracleFailure::Timeout(limit).into());
            }
            Ok(Err(error)) => {
                warn!(mover = self.mover.name(), %error, "external mover failed");
                return Err(OracleFailure::Mover(error).into());
            }
            Ok(Ok(candidate)) => candidate,
        };

        match parse_san(self.board(), &candidate, self.config.notation) {
            Ok(mv) => {
                let by = self.mover.name().to_string();
                Ok(self.accept(mv, &by))
            }
            Err(reason) => {
                warn!(mover = self.mover.name(), candidate = %candidate, %reason, "external mover proposed an invalid move");
                Err(OracleFailure::Rejected { candidate, reason }.into())
            }
        }
    }

    fn accept(&mut self, mv: Move, by: &str) -> AcceptedMove {
        let entry = self.history.push(mv);
        let san = entry.san.clone();
        let ply = self.history.len();
        info!(by, san = %san, ply, "move accepted");

        self.state = self.derive_state();
        if let SessionState::Terminal(termination) = self.state {
            info!(%termination, "game over");
        }

        AcceptedMove {
            san,
            uci: mv.as_algebraic(),
            status: self.status(),
            summary: self.summary(),
        }
    }

    pub fn status(&self) -> GameStatus {
        let board = self.board();
        let termination = match self.state {
            SessionState::Terminal(termination) => Some(termination),
            _ => None,
        };
        let in_check = board.is_check();
        let message = match termination {
            Some(termination) => termination.message(),
            None if in_check => format!("{} to move, in check", board.active_color),
            None => format!("{} to move", board.active_color),
        };
        GameStatus {
            state: self.state,
            to_move: board.active_color,
            in_check,
            terminal: termination.is_some(),
            termination,
            winner: termination.and_then(|t| t.winner()),
            fullmove_number: board.fullmove_number,
            message,
        }
    }

    pub fn summary(&self) -> PositionSummary {
        PositionSummary::of(self.board())
    }

    /// Legal moves of the side to move in SAN, empty once the game is over.
    pub fn legal_moves(&self) -> Vec<String> {
        match self.state {
            SessionState::Terminal(_) => Vec::new(),
            _ => legal_sans(self.board()),
        }
    }

    /// Throws the game away and starts over from the same start position.
    pub fn reset(&mut self) {
        info!(moves = self.history.len(), "session reset");
        self.history = GameHistory::new(self.history.start().clone());
        self.state = self.derive_state();
    }
}
