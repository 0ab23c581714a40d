//! Process-wide credential context and sign-out side effects.
//!
//! The engine never caches a credential per request: both the batch
//! transport and the push channel read the current
//! [`domain::Credential`] from one shared [`session::AuthSession`] at the
//! moment a network action occurs, so a sign-out takes effect on the very
//! next send or reconnect without explicit coordination.

pub mod domain;
pub mod ports;
pub mod session;

#[cfg(test)]
mod tests;
