//! Engine configuration.

use std::time::Duration;

use crate::push::backoff::BackoffPolicy;
use crate::transport::batching::DEFAULT_BATCH_WINDOW;

/// Tunables for the composed engine.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use palaver::client::config::ClientConfig;
///
/// let config = ClientConfig {
///     batch_window: Duration::from_millis(20),
///     ..ClientConfig::default()
/// };
/// assert_eq!(config.batch_window, Duration::from_millis(20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Rolling window within which outbound operations are batched.
    pub batch_window: Duration,
    /// Backoff policy for push reconnection attempts.
    pub reconnect: BackoffPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            batch_window: DEFAULT_BATCH_WINDOW,
            reconnect: BackoffPolicy::default(),
        }
    }
}
