//! Storage layer for localstore
//!
//! This crate defines the backend seam and its implementations:
//! - [`Backend`]: open / execute / query / close over a two-column table
//! - [`Statement`] and [`Query`]: the closed set of operations a store issues
//! - [`Row`]: ordered named columns returned by queries
//! - [`SqliteBackend`]: file-backed engine (rusqlite, bundled SQLite)
//! - [`MemoryBackend`]: in-process engine with identical row semantics
//!
//! A backend is owned by exactly one worker thread, so the trait takes
//! `&mut self` and requires only `Send`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod memory;
pub mod sqlite;

pub use backend::{Backend, ColumnValue, Query, Row, Statement};
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
