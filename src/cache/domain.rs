//! Cache identity and slot types.

use serde_json::Value;

/// Identity of a cached result: an operation name plus the canonical JSON
/// text of its variables.
///
/// `serde_json` objects are key-ordered, so two variable maps that are
/// deep-value-equal canonicalise to the same text regardless of how they
/// were built. Signatures therefore compare by value, never by reference.
///
/// # Examples
///
/// ```
/// use palaver::cache::domain::QuerySignature;
/// use serde_json::json;
///
/// let a = QuerySignature::new("group", &json!({ "groupId": 1, "first": 10 }));
/// let b = QuerySignature::new("group", &json!({ "first": 10, "groupId": 1 }));
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuerySignature {
    operation: String,
    variables: String,
}

impl QuerySignature {
    /// Builds a signature from an operation name and its variables.
    #[must_use]
    pub fn new(operation: impl Into<String>, variables: &Value) -> Self {
        Self {
            operation: operation.into(),
            variables: serde_json::to_string(variables).unwrap_or_default(),
        }
    }

    /// Returns the operation name.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns the canonical variables text.
    #[must_use]
    pub fn canonical_variables(&self) -> &str {
        &self.variables
    }
}

/// Whether a cache slot holds a confirmed server result or a local guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Written optimistically before the server responded; expected to be
    /// superseded or reverted.
    Speculative,
    /// Confirmed by a server response or push event.
    Authoritative,
}

/// One cache slot: a whole result tree tagged with its confirmation status.
///
/// The tag makes the mutation engine's two-phase commit trivial: phase one
/// writes a `Speculative` entry, phase two replaces it with an
/// `Authoritative` one, and reverting a failed mutation restores the prior
/// slot value verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    status: EntryStatus,
    value: Value,
}

impl CacheEntry {
    /// Creates a slot holding a confirmed result.
    #[must_use]
    pub const fn authoritative(value: Value) -> Self {
        Self {
            status: EntryStatus::Authoritative,
            value,
        }
    }

    /// Creates a slot holding an optimistic result.
    #[must_use]
    pub const fn speculative(value: Value) -> Self {
        Self {
            status: EntryStatus::Speculative,
            value,
        }
    }

    /// Creates a slot with an explicit status.
    #[must_use]
    pub const fn with_status(status: EntryStatus, value: Value) -> Self {
        Self { status, value }
    }

    /// Returns the slot status.
    #[must_use]
    pub const fn status(&self) -> EntryStatus {
        self.status
    }

    /// Returns `true` while the slot holds an unconfirmed result.
    #[must_use]
    pub const fn is_speculative(&self) -> bool {
        matches!(self.status, EntryStatus::Speculative)
    }

    /// Returns the stored result tree.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Consumes the slot, returning the result tree.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Returns a slot with the same status and a transformed tree.
    #[must_use]
    pub fn map_value(self, f: impl FnOnce(Value) -> Value) -> Self {
        Self {
            status: self.status,
            value: f(self.value),
        }
    }
}
