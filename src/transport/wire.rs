//! Positional batch wire format.
//!
//! A batch is one HTTP request body carrying an ordered array of
//! operations; the response body is an ordered array of per-operation
//! results aligned by position.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::domain::QuerySignature;

/// One outbound operation: a named query or mutation plus its variables.
///
/// The `authorization` field is absent until the interceptor attaches the
/// current bearer credential; it never participates in coalescing
/// identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOperation {
    operation: String,
    variables: Value,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    authorization: Option<String>,
}

impl WireOperation {
    /// Creates an operation with no credential attached.
    #[must_use]
    pub fn new(operation: impl Into<String>, variables: Value) -> Self {
        Self {
            operation: operation.into(),
            variables,
            authorization: None,
        }
    }

    /// Returns the operation name.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns the variables object.
    #[must_use]
    pub const fn variables(&self) -> &Value {
        &self.variables
    }

    /// Returns the attached `Authorization` header value, if any.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Returns the operation with a credential attached.
    #[must_use]
    pub fn with_authorization(mut self, header: String) -> Self {
        self.authorization = Some(header);
        self
    }

    /// Returns the cache signature identifying this operation's result.
    #[must_use]
    pub fn signature(&self) -> QuerySignature {
        QuerySignature::new(&self.operation, &self.variables)
    }

    /// Returns `true` when `other` is the same operation with
    /// deep-value-equal variables, regardless of attached credentials.
    #[must_use]
    pub fn coalesces_with(&self, other: &Self) -> bool {
        self.operation == other.operation && self.variables == other.variables
    }
}

/// One per-operation error inside an otherwise-delivered batch response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    message: String,
}

impl WireError {
    /// Creates an error with the given message text.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One positional slot of a batch response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WireResult {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    errors: Vec<WireError>,
}

impl WireResult {
    /// Creates a successful result carrying `value`.
    #[must_use]
    pub const fn data(value: Value) -> Self {
        Self {
            data: Some(value),
            errors: Vec::new(),
        }
    }

    /// Creates a failed result carrying one error message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![WireError::new(message)],
        }
    }

    /// Returns the result payload, if the operation succeeded.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Consumes the result, returning the payload.
    #[must_use]
    pub fn into_payload(self) -> Option<Value> {
        self.data
    }

    /// Returns the per-operation errors.
    #[must_use]
    pub fn errors(&self) -> &[WireError] {
        &self.errors
    }
}
