//! Concrete implementations of the batch-sending port.

pub mod http;
pub mod memory;
