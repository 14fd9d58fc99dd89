use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use super::ExternalMover;
use crate::chess_boards::chess_board::fen::INITIAL_POSITION;
use crate::chess_boards::chess_board::{parse_san, to_san, ChessBoard};
use crate::config::NotationMode;
use crate::error::MoverError;
use crate::history::GameHistory;

/// Asks a UCI engine process for its best move.
pub struct UciEngineMover {
    name: String,
    movetime: Duration,
    start: ChessBoard,
    // kept so the engine is killed when the mover is dropped
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl UciEngineMover {
    /// Starts the engine and completes the `uci` / `isready` handshake.
    pub async fn spawn(path: impl AsRef<Path>, movetime: Duration) -> Result<Self, MoverError> {
        let path = path.as_ref();
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MoverError::Unavailable(format!("{}: {}", path.display(), e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MoverError::Unavailable("engine stdin is not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MoverError::Unavailable("engine stdout is not piped".to_string()))?;

        let mut mover = Self {
            name: path.display().to_string(),
            movetime,
            start: ChessBoard::starting_position(),
            _child: child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        };

        mover.send("uci").await?;
        loop {
            let line = mover.read_line().await?;
            if let Some(name) = line.strip_prefix("id name ") {
                mover.name = name.to_string();
            } else if line == "uciok" {
                break;
            }
        }
        mover.synchronize().await?;
        Ok(mover)
    }

    /// Uses `start` instead of the initial position for the games it is asked about.
    pub fn with_start_position(mut self, start: ChessBoard) -> Self {
        self.start = start;
        self
    }

    async fn send(&mut self, command: &str) -> Result<(), MoverError> {
        debug!(engine = %self.name, command, "to engine");
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, MoverError> {
        match self.stdout.next_line().await? {
            Some(line) => {
                debug!(engine = %self.name, line = %line, "from engine");
                Ok(line.trim().to_string())
            }
            None => Err(MoverError::Protocol("engine closed its output".to_string())),
        }
    }

    /// Waits until the engine has processed everything sent so far.
    ///
    /// Output left over from an abandoned request, such as a late `bestmove`, is skipped here.
    async fn synchronize(&mut self) -> Result<(), MoverError> {
        self.send("isready").await?;
        while self.read_line().await? != "readyok" {}
        Ok(())
    }

    fn position_command(&self, moves: &[String]) -> String {
        let start_fen = self.start.to_fen();
        let mut command = if start_fen == INITIAL_POSITION {
            "position startpos".to_string()
        } else {
            format!("position fen {}", start_fen)
        };
        if !moves.is_empty() {
            command.push_str(" moves ");
            command.push_str(&moves.join(" "));
        }
        command
    }
}

#[async_trait]
impl ExternalMover for UciEngineMover {
    fn name(&self) -> &str {
        &self.name
    }

    async fn propose(&mut self, history: &[String]) -> Result<String, MoverError> {
        let history = GameHistory::replay(self.start.clone(), history, NotationMode::Lenient)
            .map_err(|e| MoverError::Protocol(e.to_string()))?;

        self.send("stop").await?;
        self.synchronize().await?;

        let position = self.position_command(&history.coordinates());
        self.send(&position).await?;
        self.send(&format!("go movetime {}", self.movetime.as_millis())).await?;

        loop {
            let line = self.read_line().await?;
            let mut tokens = line.split_whitespace();
            if tokens.next() != Some("bestmove") {
                continue;
            }
            return match tokens.next() {
                None | Some("(none)") | Some("0000") => {
                    Err(MoverError::Protocol(format!("engine has no move: '{}'", line)))
                }
                Some(candidate) => {
                    // SAN when the engine's move is legal, otherwise the raw text for the session to reject
                    let board = history.current();
                    Ok(parse_san(board, candidate, NotationMode::Lenient)
                        .map(|mv| to_san(board, &mv))
                        .unwrap_or_else(|_| candidate.to_string()))
                }
            };
        }
    }

    async fn shutdown(&mut self) -> Result<(), MoverError> {
        self.send("quit").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_engine_is_unavailable() {
        let result = UciEngineMover::spawn("/nonexistent/uci-engine", Duration::from_millis(10)).await;
        assert!(matches!(result, Err(MoverError::Unavailable(_))));
    }
}
