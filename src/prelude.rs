//! Convenient imports for localstore.
//!
//! ```ignore
//! use localstore::prelude::*;
//!
//! let store = Store::new();
//! store.init("test.db", "data");
//! ```

// Main entry point
pub use crate::store::{Store, StoreBuilder};

// Error handling
pub use crate::types::{Error, Result};

// Configuration and backends
pub use crate::types::{Backend, MemoryBackend, SqliteBackend, StoreConfig};
