//! Chat domain model and the named operation surface.
//!
//! Pure types for users, groups, and messages, plus descriptor constructors
//! for the queries, mutations, and cache signatures the engine exchanges
//! with the server. The server assigns positive integer ids; a negative
//! message id is a client-generated sentinel that is superseded, never
//! merged, once the authoritative entity arrives.

pub mod domain;
pub mod operations;

#[cfg(test)]
mod tests;
