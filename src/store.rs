//! The key-value store.
//!
//! This module provides [`Store`], the entry point for all key-value
//! operations, and [`StoreBuilder`] for configuring it.
//!
//! Every operation is a task on the store's worker thread:
//!
//! | Operation | Mode | Returns |
//! |-----------|------|---------|
//! | [`Store::set_item`] | async | `()` once queued |
//! | [`Store::remove_item`] | async | `()` once queued |
//! | [`Store::clear`] | async | `()` once queued |
//! | [`Store::get_item`] | sync | value or `None` |
//! | [`Store::get_key`] | sync | key or `None` |
//! | [`Store::get_length`] | sync | row count |
//! | [`Store::keys`] | sync | all keys |
//! | [`Store::entries`] | sync | all records |
//!
//! Sync reads observe every write queued before them. A read whose task
//! fails inside the backend is logged on the worker and reported as a miss
//! (`None`, or `0` for the length), exactly like a genuinely absent row.

use localstore_concurrency::{Dispatcher, Worker, WorkerMetrics};
use localstore_core::{Error, KeyValueRecord, Result, StoreConfig, TableName};
use localstore_storage::{Backend, MemoryBackend, Query, SqliteBackend, Statement};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Live state between `init` and `destroy`.
struct Session<B: Backend> {
    name: String,
    table: Arc<TableName>,
    dispatcher: Dispatcher<B>,
}

/// A key-value store served by a single worker thread.
///
/// A store starts uninitialized. [`init`](Store::init) opens the backend,
/// creates the table and starts the worker; [`destroy`](Store::destroy)
/// flushes, closes and stops. Operations outside that window fail with
/// [`Error::NotInitialized`].
///
/// `Store` is `Send + Sync`; share it between threads with `Arc<Store>`.
///
/// # Example
///
/// ```ignore
/// use localstore::prelude::*;
///
/// let store = Store::builder().data_dir("./saves").build()?;
/// assert!(store.init("test.db", "data"));
///
/// store.set_item("a", "1")?;
/// assert_eq!(store.get_item("a")?.as_deref(), Some("1"));
///
/// store.destroy()?;
/// ```
pub struct Store<B: Backend = SqliteBackend> {
    config: StoreConfig,
    session: RwLock<Option<Session<B>>>,
}

impl Store<SqliteBackend> {
    /// Create an uninitialized SQLite-backed store with default settings.
    ///
    /// Database files land in the current directory.
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            session: RwLock::new(None),
        }
    }

    /// Create a builder for store configuration.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }
}

impl Default for Store<SqliteBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl Store<MemoryBackend> {
    /// Create an uninitialized store with no disk I/O.
    ///
    /// Call [`init`](Store::init) before use. All data is lost on `destroy`.
    pub fn ephemeral() -> Self {
        Self {
            config: StoreConfig::default(),
            session: RwLock::new(None),
        }
    }
}

impl<B: Backend> Store<B> {
    /// Create an uninitialized store for any backend.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            session: RwLock::new(None),
        })
    }

    /// The configuration this store opens backends with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the backend for `name`, create `table` and start the worker.
    ///
    /// Returns `false` if the storage environment is unavailable or the
    /// arguments are invalid; no worker is started in that case. The cause
    /// is logged. Use [`try_init`](Store::try_init) to receive it instead.
    pub fn init(&self, name: &str, table: &str) -> bool {
        match self.try_init(name, table) {
            Ok(()) => true,
            Err(e) => {
                warn!(store = name, table, error = %e, "store init failed");
                false
            }
        }
    }

    /// Like [`init`](Store::init), returning the failure.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `table` is not a plain identifier
    /// - `Open` if the backend cannot be opened
    /// - `InvalidState` if the store is already initialized
    pub fn try_init(&self, name: &str, table: &str) -> Result<()> {
        let table = TableName::new(table)?;
        let mut session = self.session.write();
        if session.is_some() {
            return Err(Error::InvalidState("store is already initialized".into()));
        }

        let mut backend = B::open(&self.config, name)?;
        if let Err(e) = backend.execute(&Statement::CreateTable { table: &table }) {
            let _ = backend.close();
            return Err(e);
        }

        let worker = Arc::new(Worker::new(self.config.worker_name.clone()));
        worker.start(backend)?;

        debug!(store = name, table = %table, "store initialized");
        *session = Some(Session {
            name: name.to_string(),
            table: Arc::new(table),
            dispatcher: Dispatcher::new(worker),
        });
        Ok(())
    }

    /// Whether `init` has succeeded and `destroy` has not run since.
    pub fn is_initialized(&self) -> bool {
        self.session.read().is_some()
    }

    /// Flush pending writes, close the backend and stop the worker.
    ///
    /// Every async operation that returned `Ok` is applied before the
    /// backend closes. One racing `destroy` on another thread either lands
    /// or fails with `InvalidState`. Afterwards the store is unusable until
    /// the next `init`.
    pub fn destroy(&self) -> Result<()> {
        let session = self.session.write().take().ok_or(Error::NotInitialized)?;
        // Writers that cloned the dispatcher before `take` either land
        // before the close or get `InvalidState`.
        let stopped = session
            .dispatcher
            .worker()
            .stop_with(|backend: &mut B| backend.close());
        debug!(store = %session.name, "store destroyed");
        stopped
    }

    // =========================================================================
    // Writes (async)
    // =========================================================================

    /// Insert `key` or replace its value.
    ///
    /// Returns once the write is queued.
    pub fn set_item(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let (dispatcher, table) = self.session()?;
        let key = key.into();
        let value = value.into();
        dispatcher.post(move |backend| {
            backend.execute(&Statement::Upsert {
                table: &table,
                key: &key,
                value: &value,
            })?;
            Ok(())
        })
    }

    /// Delete `key` if present.
    ///
    /// Returns once the delete is queued.
    pub fn remove_item(&self, key: impl Into<String>) -> Result<()> {
        let (dispatcher, table) = self.session()?;
        let key = key.into();
        dispatcher.post(move |backend| {
            backend.execute(&Statement::Delete {
                table: &table,
                key: &key,
            })?;
            Ok(())
        })
    }

    /// Delete every record.
    ///
    /// Returns once the delete is queued.
    pub fn clear(&self) -> Result<()> {
        let (dispatcher, table) = self.session()?;
        dispatcher.post(move |backend| {
            backend.execute(&Statement::Clear { table: &table })?;
            Ok(())
        })
    }

    // =========================================================================
    // Reads (sync)
    // =========================================================================

    /// Value stored under `key`, or `None`.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let (dispatcher, table) = self.session()?;
        let key = key.to_string();
        dispatcher.call_or_default(move |backend| {
            let rows = backend.query(&Query::SelectValue {
                table: &table,
                key: &key,
            })?;
            if rows.len() > 1 {
                warn!(table = %table, key = %key, rows = rows.len(), "key has more than one value");
            }
            Ok(rows
                .first()
                .and_then(|row| row.get_text("value"))
                .map(String::from))
        })
    }

    /// Key at zero-based position `index` in row-creation order, or `None`
    /// when `index >= get_length()`.
    ///
    /// Rewriting a key with [`set_item`](Store::set_item) re-creates its
    /// row, moving it to the last position.
    pub fn get_key(&self, index: usize) -> Result<Option<String>> {
        let (dispatcher, table) = self.session()?;
        dispatcher.call_or_default(move |backend| {
            let rows = backend.query(&Query::KeyAt {
                table: &table,
                index,
            })?;
            Ok(rows
                .first()
                .and_then(|row| row.get_text("key"))
                .map(String::from))
        })
    }

    /// Number of records.
    pub fn get_length(&self) -> Result<usize> {
        let (dispatcher, table) = self.session()?;
        dispatcher.call_or_default(move |backend| {
            let rows = backend.query(&Query::Count { table: &table })?;
            let count = rows
                .first()
                .and_then(|row| row.get_integer("nums"))
                .unwrap_or(0);
            Ok(usize::try_from(count).unwrap_or(0))
        })
    }

    /// Every key in row-creation order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let (dispatcher, table) = self.session()?;
        dispatcher.call_or_default(move |backend| {
            let rows = backend.query(&Query::Keys { table: &table })?;
            Ok(rows
                .iter()
                .filter_map(|row| row.get_text("key").map(String::from))
                .collect())
        })
    }

    /// Every record in row-creation order.
    pub fn entries(&self) -> Result<Vec<KeyValueRecord>> {
        let (dispatcher, table) = self.session()?;
        dispatcher.call_or_default(move |backend| {
            let rows = backend.query(&Query::Entries { table: &table })?;
            Ok(rows
                .iter()
                .filter_map(|row| {
                    Some(KeyValueRecord::new(row.get_text("key")?, row.get_text("value")?))
                })
                .collect())
        })
    }

    /// Block until every operation queued so far has been applied.
    pub fn flush(&self) -> Result<()> {
        let (dispatcher, _) = self.session()?;
        dispatcher.flush()
    }

    /// Worker task counters.
    pub fn metrics(&self) -> Result<WorkerMetrics> {
        let (dispatcher, _) = self.session()?;
        Ok(dispatcher.worker().metrics())
    }

    /// Clone the dispatcher and table out of the session lock so no lock is
    /// held while a sync call blocks.
    fn session(&self) -> Result<(Dispatcher<B>, Arc<TableName>)> {
        let session = self.session.read();
        let session = session.as_ref().ok_or(Error::NotInitialized)?;
        Ok((session.dispatcher.clone(), Arc::clone(&session.table)))
    }
}

impl<B: Backend> Drop for Store<B> {
    fn drop(&mut self) {
        if self.session.get_mut().is_some() {
            if let Err(e) = self.destroy() {
                warn!(error = %e, "store destroy failed during drop");
            }
        }
    }
}

/// Builder for store configuration.
///
/// # Example
///
/// ```ignore
/// let store = Store::builder()
///     .data_dir("./saves")
///     .create_dirs(false)
///     .worker_name("save-worker")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    config: StoreConfig,
}

impl StoreBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Directory holding database files.
    pub fn data_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Whether to create a missing data directory.
    pub fn create_dirs(mut self, create: bool) -> Self {
        self.config.create_dirs = create;
        self
    }

    /// Name for the worker thread.
    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.config.worker_name = name.into();
        self
    }

    /// SQLite busy timeout in milliseconds.
    pub fn busy_timeout_ms(mut self, ms: u64) -> Self {
        self.config.busy_timeout_ms = ms;
        self
    }

    /// Build a SQLite-backed store.
    pub fn build(self) -> Result<Store> {
        Store::with_config(self.config)
    }

    /// Build a store over any backend.
    pub fn build_with<B: Backend>(self) -> Result<Store<B>> {
        Store::with_config(self.config)
    }
}
