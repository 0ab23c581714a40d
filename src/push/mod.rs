//! The lazy, reconnecting subscription channel.
//!
//! One underlying connection carries every topic the client subscribes to.
//! Nothing is established until the first `open`; afterwards the driver
//! keeps the connection alive indefinitely, re-sending the current
//! credential and the full topic snapshot on every reconnect. Events
//! published while disconnected are lost: the engine accepts
//! eventual-consistency gaps during outages rather than buffering.

pub mod adapters;
pub mod backoff;
pub mod channel;
pub mod domain;
pub mod error;
pub mod ports;

#[cfg(test)]
mod tests;
