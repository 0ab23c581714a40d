//! HTTP implementation of the [`BatchSender`] port.

use async_trait::async_trait;

use crate::transport::{
    error::TransportError,
    ports::BatchSender,
    wire::{WireOperation, WireResult},
};

/// Sends each batch as one `POST` carrying a JSON array of operations and
/// expects a positional JSON array of results back.
///
/// Non-2xx statuses and connection failures surface as
/// [`TransportError::Network`]; a body that does not parse as a result
/// array surfaces as [`TransportError::Malformed`]. No retries.
pub struct HttpBatchSender {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBatchSender {
    /// Creates a sender posting to `endpoint` with a default client.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Creates a sender reusing an existing client (connection pooling,
    /// proxies, timeouts are the caller's concern).
    #[must_use]
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl BatchSender for HttpBatchSender {
    async fn send(&self, batch: Vec<WireOperation>) -> Result<Vec<WireResult>, TransportError> {
        let response = self
            .client
            .post(self.endpoint.as_str())
            .json(&batch)
            .send()
            .await
            .map_err(|error| TransportError::network(error.to_string()))?;
        let delivered = response
            .error_for_status()
            .map_err(|error| TransportError::network(error.to_string()))?;
        delivered
            .json::<Vec<WireResult>>()
            .await
            .map_err(|error| TransportError::malformed(error.to_string()))
    }
}
