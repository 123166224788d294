//! Store Integration Tests
//!
//! End-to-end tests for the key-value store: operations, row ordering,
//! lifecycle, failure absorption and multi-threaded use.

mod common;

mod concurrency;
mod failures;
mod ordering;
