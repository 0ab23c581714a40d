//! The batch-sending port.

use async_trait::async_trait;

use crate::transport::{
    error::TransportError,
    wire::{WireOperation, WireResult},
};

/// Port for delivering one assembled batch to the server.
///
/// Implementations perform exactly one round-trip per call and must
/// preserve positional alignment: result `i` answers operation `i`. They
/// never retry; a failed round-trip is reported as a [`TransportError`]
/// and surfaced to every waiter by the batching layer.
#[async_trait]
pub trait BatchSender: Send + Sync {
    /// Sends `batch` and returns the positional results.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if no positionally-aligned response was
    /// obtained.
    async fn send(&self, batch: Vec<WireOperation>) -> Result<Vec<WireResult>, TransportError>;
}
