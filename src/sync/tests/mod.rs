//! Unit tests for the reconciliation layer.

mod merge_tests;
