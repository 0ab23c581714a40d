//! The windowed, coalescing batch scheduler.

use std::mem;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::transport::{
    error::{OperationError, TransportError},
    ports::BatchSender,
    wire::{WireOperation, WireResult},
};

/// Default rolling batch window.
pub const DEFAULT_BATCH_WINDOW: Duration = Duration::from_millis(10);

type OperationOutcome = Result<Value, OperationError>;

struct PendingOperation {
    operation: WireOperation,
    waiters: Vec<oneshot::Sender<OperationOutcome>>,
}

#[derive(Default)]
struct BatchQueue {
    entries: Vec<PendingOperation>,
    flush_scheduled: bool,
}

struct BatchInner<S> {
    sender: S,
    window: Duration,
    queue: Mutex<BatchQueue>,
}

/// Collects operations issued within a rolling window into one wire batch.
///
/// The first submission of a window schedules a flush after the window
/// elapses; submissions with deep-value-equal (operation, variables) during
/// that window coalesce into a single wire entry, and every caller of a
/// coalesced entry receives the same outcome. Responses demultiplex by
/// position. A transport failure rejects every waiter in the batch; nothing
/// is retried here.
///
/// Cloning is cheap and shares the same queue.
pub struct BatchedTransport<S> {
    inner: Arc<BatchInner<S>>,
}

impl<S> Clone for BatchedTransport<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> BatchedTransport<S>
where
    S: BatchSender + 'static,
{
    /// Creates a transport flushing after `window`.
    #[must_use]
    pub fn new(sender: S, window: Duration) -> Self {
        Self {
            inner: Arc::new(BatchInner {
                sender,
                window,
                queue: Mutex::new(BatchQueue::default()),
            }),
        }
    }

    /// Creates a transport with the default window.
    #[must_use]
    pub fn with_default_window(sender: S) -> Self {
        Self::new(sender, DEFAULT_BATCH_WINDOW)
    }

    /// Submits one operation and resolves with its slice of the batch
    /// response.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Transport`] when the batch round-trip
    /// fails, [`OperationError::Server`] for a per-operation error, or
    /// [`OperationError::MissingData`] when the slot is empty.
    ///
    /// # Panics
    ///
    /// Must be called within a Tokio runtime (the flush timer is a spawned
    /// task).
    pub async fn execute(&self, operation: WireOperation) -> Result<Value, OperationError> {
        let receiver = {
            let mut queue = self
                .inner
                .queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let (sender, receiver) = oneshot::channel();
            if let Some(entry) = queue
                .entries
                .iter_mut()
                .find(|entry| entry.operation.coalesces_with(&operation))
            {
                trace!(operation = %operation.operation(), "coalescing into pending batch entry");
                entry.waiters.push(sender);
            } else {
                queue.entries.push(PendingOperation {
                    operation,
                    waiters: vec![sender],
                });
            }
            if !queue.flush_scheduled {
                queue.flush_scheduled = true;
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    tokio::time::sleep(inner.window).await;
                    BatchInner::flush(&inner).await;
                });
            }
            receiver
        };

        receiver
            .await
            .map_err(|_| OperationError::Transport(TransportError::network("batch flush aborted")))?
    }
}

impl<S> BatchInner<S>
where
    S: BatchSender,
{
    async fn flush(inner: &Arc<Self>) {
        let entries = {
            let mut queue = inner.queue.lock().unwrap_or_else(PoisonError::into_inner);
            queue.flush_scheduled = false;
            mem::take(&mut queue.entries)
        };
        if entries.is_empty() {
            return;
        }

        let batch: Vec<WireOperation> = entries
            .iter()
            .map(|entry| entry.operation.clone())
            .collect();
        debug!(operations = batch.len(), "flushing request batch");

        match inner.sender.send(batch).await {
            Err(error) => {
                debug!(%error, "batch round-trip failed");
                let outcome = Err(error.into());
                for entry in entries {
                    Self::deliver(entry.waiters, &outcome);
                }
            }
            Ok(results) => {
                if results.len() == entries.len() {
                    for (entry, result) in entries.into_iter().zip(results) {
                        Self::deliver(entry.waiters, &Self::demultiplex(result));
                    }
                } else {
                    let outcome = Err(TransportError::malformed(format!(
                        "expected {} results, received {}",
                        entries.len(),
                        results.len()
                    ))
                    .into());
                    for entry in entries {
                        Self::deliver(entry.waiters, &outcome);
                    }
                }
            }
        }
    }

    fn deliver(waiters: Vec<oneshot::Sender<OperationOutcome>>, outcome: &OperationOutcome) {
        for waiter in waiters {
            // A dropped receiver means the caller stopped waiting; the
            // outcome is simply discarded.
            let _ = waiter.send(outcome.clone());
        }
    }

    fn demultiplex(result: WireResult) -> OperationOutcome {
        if let Some(error) = result.errors().first() {
            return Err(OperationError::Server(error.message().to_owned()));
        }
        result.into_payload().ok_or(OperationError::MissingData)
    }
}
