//! The result cache store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::cache::domain::{CacheEntry, QuerySignature};

/// Whole-result cache keyed by [`QuerySignature`].
///
/// Writes replace the entire tree for a signature; callers merge before
/// writing. A stale entry remains until explicitly overwritten or removed.
///
/// Concurrent writers to one signature serialise through the internal lock:
/// the closure passed to [`ResultCache::update`] runs while the lock is
/// held, so no other read or write of that signature can interleave with a
/// read-modify-write. Closures must therefore be synchronous and quick.
/// A poisoned lock is recovered rather than propagated; the map only ever
/// holds fully-written entries.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<QuerySignature, CacheEntry>>,
}

impl ResultCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the entry for `signature`, if present.
    #[must_use]
    pub fn read(&self, signature: &QuerySignature) -> Option<CacheEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(signature)
            .cloned()
    }

    /// Unconditionally replaces the entry for `signature`.
    pub fn write(&self, signature: QuerySignature, entry: CacheEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(signature, entry);
    }

    /// Removes and returns the entry for `signature`.
    pub fn remove(&self, signature: &QuerySignature) -> Option<CacheEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(signature)
    }

    /// Atomically transforms the entry for `signature`.
    ///
    /// The closure receives the current entry (or `None`) and returns the
    /// replacement (`None` removes the slot). It runs under the cache lock,
    /// so it must not block or suspend. Returns the prior entry.
    pub fn update<F>(&self, signature: &QuerySignature, f: F) -> Option<CacheEntry>
    where
        F: FnOnce(Option<CacheEntry>) -> Option<CacheEntry>,
    {
        let mut guard = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let prior = guard.get(signature).cloned();
        match f(prior.clone()) {
            Some(next) => {
                guard.insert(signature.clone(), next);
            }
            None => {
                guard.remove(signature);
            }
        }
        prior
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
