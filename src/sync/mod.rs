//! Reconciliation of the three arrival paths into one cache.
//!
//! Optimistic local edits, authoritative mutation responses, and push
//! events all end up writing the same cache entries. The reconciler runs
//! the two-phase speculative/authoritative protocol for mutations; the
//! merge reducers apply push events and mutation confirmations with the
//! deduplication rule that makes the engine safe against a user's own
//! mutation echoing back over the subscription channel.

pub mod merge;
pub mod patch;
pub mod reconciler;

#[cfg(test)]
mod tests;
