//! Unit tests for the composed facade.
