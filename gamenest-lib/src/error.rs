use std::time::Duration;

use thiserror::Error;

/// Errors raised by background enrichment work.
///
/// These never reach the scan that scheduled the work; the enrichment pool
/// logs them and moves on.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// I/O error while reading a game folder or writing an artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An external collaborator (icon extractor, artwork service) failed
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    /// The hook did not finish within the safety timeout
    #[error("Timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    /// The hook panicked or its task was cancelled
    #[error("Hook aborted: {0}")]
    Aborted(String),
}

impl EnrichError {
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator,
            message: message.into(),
        }
    }

    pub fn aborted(msg: impl Into<String>) -> Self {
        Self::Aborted(msg.into())
    }
}
