//! Notifier Port
//!
//! Delivers one group's ranked contracts to a destination (a webhook URL
//! for Discord). Formatting and chunking belong to the implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::TickerResult;

/// Errors from the notification sink
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid destination: {0:?}")]
    InvalidDestination(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Destination rejected message {part}/{total}: {status}")]
    Rejected { part: usize, total: usize, status: u16 },

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotifierPort: Send + Sync {
    /// Format and deliver the results; returns how many messages went out
    async fn notify(
        &self,
        destination: &str,
        description: &str,
        results: &[TickerResult],
    ) -> Result<usize, NotifyError>;
}
