//! Concrete implementations of the push connection port.

pub mod memory;
