//! Credential value type and the recognised authorisation-failure marker.

use std::fmt;

/// Error message text the server attaches to an operation that failed
/// authorisation.
///
/// The auth interceptor compares every per-operation error against this
/// exact string; any other error text is an ordinary operation failure.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// An opaque bearer token identifying the signed-in user.
///
/// The token is attached verbatim (with a `Bearer ` prefix) to outgoing
/// batches and sent as connection metadata on every push (re)connect. The
/// `Debug` representation is redacted so credentials never leak into logs.
///
/// # Examples
///
/// ```
/// use palaver::auth::domain::Credential;
///
/// let credential = Credential::new("jwt-abc123");
/// assert_eq!(credential.bearer(), "Bearer jwt-abc123");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Returns the token formatted as an HTTP `Authorization` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
