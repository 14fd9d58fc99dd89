//! External movers propose replies for the session to validate.
//!
//! A mover is untrusted: whatever it returns is parsed and checked against
//! the legal moves of the position exactly like a human move.

use async_trait::async_trait;

use crate::error::MoverError;

mod random;
mod scripted;
mod uci;

pub use random::RandomMover;
pub use scripted::ScriptedMover;
pub use uci::UciEngineMover;

#[async_trait]
pub trait ExternalMover: Send {
    fn name(&self) -> &str;

    /// Proposes the next move given the game so far, as SAN moves from the start position.
    async fn propose(&mut self, history: &[String]) -> Result<String, MoverError>;

    /// Releases whatever the mover holds once the game is over.
    async fn shutdown(&mut self) -> Result<(), MoverError> {
        Ok(())
    }
}

#[async_trait]
impl<M: ExternalMover + ?Sized> ExternalMover for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn propose(&mut self, history: &[String]) -> Result<String, MoverError> {
        (**self).propose(history).await
    }

    async fn shutdown(&mut self) -> Result<(), MoverError> {
        (**self).shutdown().await
    }
}
