use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use super::ExternalMover;
use crate::error::MoverError;

/// Replies with a fixed list of moves, in order, whatever the position.
#[derive(Debug, Clone, Default)]
pub struct ScriptedMover {
    replies: VecDeque<String>,
    delay: Option<Duration>,
}

impl ScriptedMover {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            delay: None,
        }
    }

    /// Waits this long before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

#[async_trait]
impl ExternalMover for ScriptedMover {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn propose(&mut self, _history: &[String]) -> Result<String, MoverError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies.pop_front().ok_or(MoverError::Exhausted)
    }
}
