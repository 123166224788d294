//! Public types re-exported from the internal crates.

// Errors and configuration
pub use localstore_core::{Error, KeyValueRecord, Result, StoreConfig, TableName};

// Backends
pub use localstore_storage::{Backend, ColumnValue, MemoryBackend, Query, Row, SqliteBackend, Statement};

// Worker introspection
pub use localstore_concurrency::{WorkerMetrics, WorkerState};
