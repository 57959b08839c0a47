//! Bounded polling policy shared by the asynchronous workflows.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::RelayError;

/// How often and how many times a workflow polls a remote task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before each fetch.
    pub interval: Duration,
    /// Fetch ceiling.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 10,
        }
    }
}

impl PollPolicy {
    #[must_use]
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Sleep one interval, returning early with [`RelayError::Cancelled`]
    /// if `cancel` fires first.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Cancelled` when the token is cancelled.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<(), RelayError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(RelayError::Cancelled),
            () = tokio::time::sleep(self.interval) => Ok(()),
        }
    }
}
