//! Transport and per-operation error types.
//!
//! Uses `thiserror` with cloneable, string-carrying variants: one
//! transport failure fans out to every waiter in the batch, so the types
//! must be `Clone`.

use thiserror::Error;

use crate::auth::domain::UNAUTHORIZED_MESSAGE;

/// A failure of the batch round-trip itself: no usable response reached
/// the demultiplexer. Never retried by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The network call failed outright.
    #[error("network failure: {0}")]
    Network(String),

    /// A response arrived but could not be aligned with the request batch.
    #[error("malformed batch response: {0}")]
    Malformed(String),
}

impl TransportError {
    /// Creates a network failure.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a malformed-response failure.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// The failure surfaced to one operation's caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The whole batch failed; every waiter in it receives this.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server rejected this operation inside an otherwise-delivered
    /// batch.
    #[error("operation failed: {0}")]
    Server(String),

    /// The server returned neither data nor an error for this position.
    #[error("operation returned no data")]
    MissingData,

    /// The operation succeeded but its payload did not match the expected
    /// shape.
    #[error("malformed operation payload: {0}")]
    Decode(String),
}

impl OperationError {
    /// Returns `true` when this is the recognised authorisation failure.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Server(message) if message == UNAUTHORIZED_MESSAGE)
    }
}
