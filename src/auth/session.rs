//! Shared mutable credential context.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::debug;

use crate::auth::{domain::Credential, ports::SignOutHook};

/// Process-wide authentication context.
///
/// One `AuthSession` is shared (via [`Arc`]) by the transport interceptor,
/// the push channel, and the consuming application. Readers always see the
/// credential as of the moment of the call; nothing snapshots it earlier.
///
/// # Examples
///
/// ```
/// use palaver::auth::domain::Credential;
/// use palaver::auth::session::AuthSession;
///
/// let session = AuthSession::new();
/// assert!(session.credential().is_none());
///
/// session.sign_in(Credential::new("jwt-abc123"));
/// assert!(session.is_signed_in());
///
/// session.sign_out();
/// assert!(session.credential().is_none());
/// ```
#[derive(Default)]
pub struct AuthSession {
    credential: RwLock<Option<Credential>>,
    hooks: Mutex<Vec<Arc<dyn SignOutHook>>>,
}

impl AuthSession {
    /// Creates a signed-out session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a credential, replacing any previous one.
    pub fn sign_in(&self, credential: Credential) {
        let mut guard = self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(credential);
    }

    /// Clears the credential and notifies sign-out hooks.
    ///
    /// Idempotent: if the session is already signed out, no hook fires.
    pub fn sign_out(&self) {
        let cleared = {
            let mut guard = self
                .credential
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            guard.take().is_some()
        };
        if !cleared {
            return;
        }

        debug!("credential cleared, notifying sign-out hooks");
        let hooks: Vec<Arc<dyn SignOutHook>> = self
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for hook in hooks {
            hook.on_sign_out();
        }
    }

    /// Returns a snapshot of the current credential.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` while a credential is present.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Registers a hook notified on each signed-in to signed-out transition.
    pub fn register_sign_out_hook(&self, hook: Arc<dyn SignOutHook>) {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hook);
    }
}
