//! Push link error types.

use thiserror::Error;

/// A failed connection attempt on the push link.
///
/// Both variants are retried indefinitely by the channel driver under its
/// backoff policy; they are never surfaced per subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushLinkError {
    /// The server actively refused the connection (for example because the
    /// presented credential was absent or invalid).
    #[error("connection rejected: {0}")]
    Rejected(String),

    /// The server could not be reached.
    #[error("connection failed: {0}")]
    Unreachable(String),
}

impl PushLinkError {
    /// Creates a rejection.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Creates an unreachable failure.
    #[must_use]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable(message.into())
    }
}
