//! Cache patch transactions with first-touch undo recording.

use serde_json::Value;

use crate::cache::{
    domain::{CacheEntry, EntryStatus, QuerySignature},
    store::ResultCache,
};

/// One recorded prior slot value: the signature and what it held before
/// the transaction first touched it (`None` for an absent slot).
pub(crate) type UndoLog = Vec<(QuerySignature, Option<CacheEntry>)>;

/// A patch function's view of the cache during one mutation phase.
///
/// Every write goes through the cache's atomic read-modify-write, is
/// tagged with the phase status (speculative or authoritative), and
/// records the slot's prior value the first time the transaction touches
/// it. The reconciler uses the recorded log to revert a failed mutation so
/// the cache is never left showing a speculative entity with no pending
/// request behind it.
///
/// Patch bodies are synchronous; they must not block.
pub struct CachePatchTxn<'a> {
    cache: &'a ResultCache,
    status: EntryStatus,
    undo: UndoLog,
}

impl<'a> CachePatchTxn<'a> {
    pub(crate) const fn new(cache: &'a ResultCache, status: EntryStatus) -> Self {
        Self {
            cache,
            status,
            undo: Vec::new(),
        }
    }

    /// Returns the current tree for `signature`, if cached.
    #[must_use]
    pub fn read(&self, signature: &QuerySignature) -> Option<Value> {
        self.cache.read(signature).map(CacheEntry::into_value)
    }

    /// Atomically transforms the tree for `signature`.
    ///
    /// The closure sees the current tree (or `None`) and returns the
    /// replacement (`None` removes the slot). The write carries this
    /// phase's status tag.
    pub fn modify<F>(&mut self, signature: &QuerySignature, f: F)
    where
        F: FnOnce(Option<Value>) -> Option<Value>,
    {
        let status = self.status;
        let prior = self.cache.update(signature, |entry| {
            f(entry.map(CacheEntry::into_value))
                .map(|tree| CacheEntry::with_status(status, tree))
        });
        self.record(signature, prior);
    }

    /// Unconditionally replaces the tree for `signature`.
    pub fn write(&mut self, signature: &QuerySignature, tree: Value) {
        self.modify(signature, |_| Some(tree));
    }

    /// Removes the slot for `signature`.
    pub fn remove(&mut self, signature: &QuerySignature) {
        self.modify(signature, |_| None);
    }

    pub(crate) fn into_undo(self) -> UndoLog {
        self.undo
    }

    fn record(&mut self, signature: &QuerySignature, prior: Option<CacheEntry>) {
        if self.undo.iter().any(|(touched, _)| touched == signature) {
            return;
        }
        self.undo.push((signature.clone(), prior));
    }
}
