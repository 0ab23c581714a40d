//! The push connection port.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::push::{
    domain::{ConnectMetadata, LinkCommand, PushEvent},
    error::PushLinkError,
};

/// A live duplex connection as seen by the channel driver.
///
/// `events` closing (all senders dropped) signals connection loss and
/// triggers a reconnect; commands sent after loss are discarded.
pub struct PushSocket {
    /// Outbound subscribe/unsubscribe frames.
    pub commands: mpsc::UnboundedSender<LinkCommand>,
    /// Inbound push events.
    pub events: mpsc::UnboundedReceiver<PushEvent>,
}

/// Port for establishing one push connection.
///
/// Implementations perform a single connection attempt per call, present
/// the metadata's credential to the server, and register its topic
/// snapshot. Reconnection policy lives in the channel driver, not here.
#[async_trait]
pub trait PushLink: Send + Sync {
    /// Attempts one connection.
    ///
    /// # Errors
    ///
    /// Returns [`PushLinkError`] when the connection could not be
    /// established; the driver retries with backoff.
    async fn connect(&self, metadata: ConnectMetadata) -> Result<PushSocket, PushLinkError>;
}
