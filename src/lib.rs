//! Palaver: client-side synchronisation engine for group chat.
//!
//! This crate keeps a locally rendered view of chat state (groups, messages)
//! consistent across three independently-arriving sources of truth:
//! optimistic local edits, authoritative mutation responses, and push
//! notifications delivered over a persistent connection.
//!
//! # Architecture
//!
//! Palaver follows hexagonal architecture principles:
//!
//! - **Domain**: Pure chat state and cache types with no infrastructure
//!   dependencies
//! - **Ports**: Abstract trait interfaces for the two network edges (batch
//!   sending and the push link) and for sign-out side effects
//! - **Adapters**: Concrete implementations of ports (HTTP, in-memory)
//!
//! # Modules
//!
//! - [`auth`]: Process-wide credential context and sign-out hooks
//! - [`cache`]: Query-keyed result cache with speculative/authoritative slots
//! - [`chat`]: Chat domain model and operation descriptors
//! - [`transport`]: Windowed request batching and the auth interceptor
//! - [`sync`]: Mutation reconciliation and subscription merge reducers
//! - [`push`]: Lazy, reconnecting subscription channel
//! - [`client`]: The composed engine facade

pub mod auth;
pub mod cache;
pub mod chat;
pub mod client;
pub mod push;
pub mod sync;
pub mod transport;
