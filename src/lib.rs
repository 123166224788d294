//! # localstore
//!
//! Embedded key-value store whose reads and writes all run on one
//! dedicated worker thread.
//!
//! Callers on any thread use two submission modes:
//!
//! - **async** (`set_item`, `remove_item`, `clear`): queue the write and
//!   return immediately
//! - **sync** (`get_item`, `get_key`, `get_length`): queue the read and block
//!   until it has run, seeing every write queued before it
//!
//! ## Quick Start
//!
//! ```ignore
//! use localstore::prelude::*;
//!
//! let store = Store::builder().data_dir("./saves").build()?;
//! if !store.init("test.db", "data") {
//!     // storage environment unavailable
//! }
//!
//! store.set_item("level", "3")?;
//! assert_eq!(store.get_item("level")?.as_deref(), Some("3"));
//! assert_eq!(store.get_length()?, 1);
//!
//! // Applies pending writes, closes the database, stops the worker
//! store.destroy()?;
//! ```
//!
//! ## Crates
//!
//! - `localstore-core` - errors, config, table names
//! - `localstore-storage` - [`Backend`] trait, SQLite and memory backends
//! - `localstore-concurrency` - worker thread, task queue, dispatcher

#![warn(missing_docs)]

mod store;
mod types;

pub mod prelude;

// Re-export main entry points
pub use store::{Store, StoreBuilder};

// Re-export types
pub use types::*;
