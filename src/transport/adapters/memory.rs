//! In-memory implementation of the [`BatchSender`] port.
//!
//! Replays scripted responses and records every batch it is handed.
//! Suitable for unit and integration tests only.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::transport::{
    error::TransportError,
    ports::BatchSender,
    wire::{WireOperation, WireResult},
};

struct ScriptedInner {
    responses: Mutex<VecDeque<Result<Vec<WireResult>, TransportError>>>,
    batches: Mutex<Vec<Vec<WireOperation>>>,
    gate: Option<Semaphore>,
}

/// Scripted in-memory [`BatchSender`].
///
/// Each `send` pops the next scripted response; an exhausted script yields
/// a network failure. The gated variant additionally holds every send until
/// [`ScriptedBatchSender::release_one`] is called, which lets tests
/// interleave push events with an in-flight mutation response.
///
/// Cloning shares the script, the recording, and the gate.
#[derive(Clone)]
pub struct ScriptedBatchSender {
    inner: Arc<ScriptedInner>,
}

impl Default for ScriptedBatchSender {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBatchSender {
    /// Creates an ungated sender: responses are returned immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a gated sender: each send blocks until released.
    #[must_use]
    pub fn gated() -> Self {
        Self::build(Some(Semaphore::new(0)))
    }

    fn build(gate: Option<Semaphore>) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                responses: Mutex::new(VecDeque::new()),
                batches: Mutex::new(Vec::new()),
                gate,
            }),
        }
    }

    /// Appends a response to the script.
    pub fn enqueue(&self, response: Result<Vec<WireResult>, TransportError>) {
        self.inner
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Releases one gated send. No-op for an ungated sender.
    pub fn release_one(&self) {
        if let Some(gate) = &self.inner.gate {
            gate.add_permits(1);
        }
    }

    /// Returns copies of every batch received so far.
    #[must_use]
    pub fn batches(&self) -> Vec<Vec<WireOperation>> {
        self.inner
            .batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of batches received so far.
    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.inner
            .batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl BatchSender for ScriptedBatchSender {
    async fn send(&self, batch: Vec<WireOperation>) -> Result<Vec<WireResult>, TransportError> {
        self.inner
            .batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(batch);

        if let Some(gate) = &self.inner.gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(TransportError::network("response gate closed")),
            }
        }

        self.inner
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("no scripted response")))
    }
}
