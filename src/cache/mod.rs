//! Query-keyed result cache.
//!
//! The cache stores the last-known whole result tree for each
//! (operation, variables) pair. There is no field-level merging and no
//! implicit invalidation: callers merge first, then replace the entire
//! tree. Both the mutation path and the subscription path write the same
//! entries, which is why every read-modify-write goes through the atomic
//! [`store::ResultCache::update`] primitive.

pub mod domain;
pub mod store;

#[cfg(test)]
mod tests;
