//! Unit tests for the subscription channel.

mod channel_tests;
