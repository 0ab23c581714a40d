//! In-memory implementation of the [`PushLink`] port.
//!
//! Gives tests full control of the server side of the connection:
//! accepting or rejecting attempts, inspecting the presented metadata,
//! injecting events, and dropping the connection to force a reconnect.
//! Suitable for tests only.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::push::{
    domain::{ConnectMetadata, LinkCommand, PushEvent},
    error::PushLinkError,
    ports::{PushLink, PushSocket},
};

/// One connection attempt awaiting the controller's verdict.
pub struct ConnectionRequest {
    metadata: ConnectMetadata,
    reply: oneshot::Sender<Result<PushSocket, PushLinkError>>,
}

impl ConnectionRequest {
    /// Returns the metadata the client presented.
    #[must_use]
    pub const fn metadata(&self) -> &ConnectMetadata {
        &self.metadata
    }

    /// Accepts the attempt, returning the server half of the connection.
    #[must_use]
    pub fn accept(self) -> LiveConnection {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let _ = self.reply.send(Ok(PushSocket {
            commands: command_tx,
            events: event_rx,
        }));
        LiveConnection {
            events: event_tx,
            commands: command_rx,
        }
    }

    /// Rejects the attempt.
    pub fn reject(self, reason: impl Into<String>) {
        let _ = self.reply.send(Err(PushLinkError::rejected(reason)));
    }
}

/// The server half of an accepted connection.
///
/// Dropping it closes the event stream, which the channel driver treats
/// as connection loss.
pub struct LiveConnection {
    events: mpsc::UnboundedSender<PushEvent>,
    commands: mpsc::UnboundedReceiver<LinkCommand>,
}

impl LiveConnection {
    /// Publishes an event to the client. Returns `false` once the client
    /// side is gone.
    pub fn push(&self, event: PushEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Awaits the next subscribe/unsubscribe frame from the client.
    pub async fn next_command(&mut self) -> Option<LinkCommand> {
        self.commands.recv().await
    }
}

/// In-memory [`PushLink`] paired with a [`PushLinkController`].
pub struct InMemoryPushLink {
    requests: mpsc::UnboundedSender<ConnectionRequest>,
}

impl InMemoryPushLink {
    /// Creates the link and the controller driving its server side.
    #[must_use]
    pub fn new() -> (Self, PushLinkController) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        (
            Self {
                requests: request_tx,
            },
            PushLinkController {
                requests: request_rx,
            },
        )
    }
}

#[async_trait]
impl PushLink for InMemoryPushLink {
    async fn connect(&self, metadata: ConnectMetadata) -> Result<PushSocket, PushLinkError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send(ConnectionRequest {
                metadata,
                reply: reply_tx,
            })
            .map_err(|_| PushLinkError::unreachable("controller dropped"))?;
        reply_rx
            .await
            .map_err(|_| PushLinkError::unreachable("controller dropped"))?
    }
}

/// Test-side handle accepting or rejecting connection attempts.
pub struct PushLinkController {
    requests: mpsc::UnboundedReceiver<ConnectionRequest>,
}

impl PushLinkController {
    /// Awaits the next connection attempt.
    pub async fn next_connection(&mut self) -> Option<ConnectionRequest> {
        self.requests.recv().await
    }

    /// Returns an already-queued connection attempt without waiting.
    pub fn try_next_connection(&mut self) -> Option<ConnectionRequest> {
        self.requests.try_recv().ok()
    }
}
