//! The optimistic mutation engine.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::{domain::EntryStatus, store::ResultCache};
use crate::sync::patch::{CachePatchTxn, UndoLog};
use crate::transport::{
    batching::BatchedTransport, error::OperationError, ports::BatchSender, wire::WireOperation,
};

/// Runs mutations under the two-phase speculative/authoritative protocol.
///
/// With a speculative result supplied, the caller's patch function is
/// applied to it synchronously *before* the request is sent, so the guess
/// is visible on the very next render. On success the same patch function
/// is applied to the authoritative response, replacing the guess; on
/// failure every touched slot is restored to its prior value and the error
/// is re-raised. The engine never retries; each call is exactly-once at
/// the transport level.
///
/// The patch function owns both supersession of the speculative entity and
/// the duplicate check against a subscription echo racing the response.
pub struct MutationReconciler<S> {
    transport: BatchedTransport<S>,
    cache: Arc<ResultCache>,
}

impl<S> MutationReconciler<S>
where
    S: BatchSender + 'static,
{
    /// Creates a reconciler writing through `cache`.
    #[must_use]
    pub const fn new(transport: BatchedTransport<S>, cache: Arc<ResultCache>) -> Self {
        Self { transport, cache }
    }

    /// Sends `request`, reconciling the cache around its lifecycle.
    ///
    /// `patch` is invoked once per phase: with `speculative` (tagged
    /// speculative, before the send) if supplied, and with the
    /// authoritative response after a successful round-trip.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`OperationError`] after reverting any
    /// speculative writes. No partial state is left visible.
    pub async fn mutate<P>(
        &self,
        request: WireOperation,
        speculative: Option<Value>,
        patch: P,
    ) -> Result<Value, OperationError>
    where
        P: Fn(&mut CachePatchTxn<'_>, &Value) + Send + Sync,
    {
        let undo = speculative.map(|guess| {
            let mut txn = CachePatchTxn::new(&self.cache, EntryStatus::Speculative);
            patch(&mut txn, &guess);
            txn.into_undo()
        });

        match self.transport.execute(request).await {
            Ok(result) => {
                let mut txn = CachePatchTxn::new(&self.cache, EntryStatus::Authoritative);
                patch(&mut txn, &result);
                Ok(result)
            }
            Err(error) => {
                if let Some(log) = undo {
                    debug!(slots = log.len(), "mutation failed, reverting speculative writes");
                    self.revert(log);
                }
                Err(error)
            }
        }
    }

    fn revert(&self, log: UndoLog) {
        for (signature, prior) in log.into_iter().rev() {
            match prior {
                Some(entry) => self.cache.write(signature, entry),
                None => {
                    self.cache.remove(&signature);
                }
            }
        }
    }
}
