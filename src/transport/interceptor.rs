//! The authentication-aware batch decorator.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::auth::{domain::UNAUTHORIZED_MESSAGE, session::AuthSession};
use crate::transport::{
    error::TransportError,
    ports::BatchSender,
    wire::{WireOperation, WireResult},
};

/// Decorates a [`BatchSender`] with credential attachment and sign-out on
/// authorisation failure.
///
/// Before each send the current credential is read from the shared
/// [`AuthSession`] (never cached) and attached to every operation in the
/// batch. After each receive, if any result in the batch carries the
/// recognised authorisation-failure message, the session is signed out
/// once per batch, no matter how many results carried it. All results,
/// including the failing ones, still pass through to the batching layer
/// unchanged so each caller sees its own outcome.
pub struct AuthInterceptor<S> {
    inner: S,
    session: Arc<AuthSession>,
}

impl<S> AuthInterceptor<S> {
    /// Wraps `inner` with the given session context.
    #[must_use]
    pub const fn new(inner: S, session: Arc<AuthSession>) -> Self {
        Self { inner, session }
    }
}

#[async_trait]
impl<S> BatchSender for AuthInterceptor<S>
where
    S: BatchSender,
{
    async fn send(&self, batch: Vec<WireOperation>) -> Result<Vec<WireResult>, TransportError> {
        let outgoing = match self.session.credential() {
            Some(credential) => {
                let header = credential.bearer();
                batch
                    .into_iter()
                    .map(|operation| operation.with_authorization(header.clone()))
                    .collect()
            }
            None => batch,
        };

        let results = self.inner.send(outgoing).await?;

        let unauthorized = results.iter().any(|result| {
            result
                .errors()
                .iter()
                .any(|error| error.message() == UNAUTHORIZED_MESSAGE)
        });
        if unauthorized {
            warn!("authorisation failure in batch response, clearing credential");
            self.session.sign_out();
        }

        Ok(results)
    }
}
