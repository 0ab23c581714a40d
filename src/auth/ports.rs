//! Sign-out side-effect port.
//!
//! The engine reacts to an authorisation failure by clearing the
//! credential; everything else that has to happen on sign-out (navigation,
//! wiping view state) belongs to the consuming application and is reached
//! through this port.

/// Port notified when the session transitions from signed-in to signed-out.
///
/// Hooks fire at most once per transition: an already-signed-out session
/// ignores further sign-out requests, so a batch whose authorisation
/// failure lands after an explicit sign-out does not replay side effects.
#[cfg_attr(test, mockall::automock)]
pub trait SignOutHook: Send + Sync {
    /// Invoked after the credential has been cleared.
    fn on_sign_out(&self);
}
