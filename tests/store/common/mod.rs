//! Shared helpers for store integration tests.

#![allow(dead_code)]

pub use localstore::prelude::*;
pub use localstore::{ColumnValue, KeyValueRecord, Query, Row, Statement, TableName};

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Install a test-writer subscriber once so worker logs show up on failure.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// SQLite-backed store in its own temporary directory.
pub struct TestStore {
    // Declared before `dir` so the store is destroyed before the files go.
    pub store: Store,
    pub dir: TempDir,
}

impl TestStore {
    /// Initialized store with database `test.db` and table `data`.
    pub fn new() -> Self {
        let mut test = Self::uninitialized();
        test.reinit();
        test
    }

    /// Store over a fresh directory, `init` not yet called.
    pub fn uninitialized() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("temp dir");
        let store = Store::builder()
            .data_dir(dir.path())
            .build()
            .expect("store config");
        Self { store, dir }
    }

    /// Run `init("test.db", "data")` again after a `destroy`.
    pub fn reinit(&mut self) {
        assert!(self.store.init("test.db", "data"), "init failed");
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("test.db")
    }
}

/// Initialized in-memory store.
pub fn memory_store() -> Store<MemoryBackend> {
    init_tracing();
    let store = Store::ephemeral();
    assert!(store.init("test.db", "data"));
    store
}

/// Memory backend that fails on purpose.
///
/// - key `"poison"`: statements and value lookups return a storage error
/// - key `"panic"`: statements and value lookups panic
/// - key `"dup"`: value lookups return two rows, `"first"` then `"second"`
/// - table `"broken"`: every query fails
pub struct FaultyBackend {
    inner: MemoryBackend,
}

impl FaultyBackend {
    fn check_key(key: &str) -> Result<()> {
        match key {
            "poison" => Err(Error::Storage("poisoned key".into())),
            "panic" => panic!("backend panicked on key"),
            _ => Ok(()),
        }
    }
}

impl Backend for FaultyBackend {
    fn open(config: &StoreConfig, name: &str) -> Result<Self> {
        Ok(Self {
            inner: MemoryBackend::open(config, name)?,
        })
    }

    fn execute(&mut self, statement: &Statement<'_>) -> Result<usize> {
        match *statement {
            Statement::Upsert { key, .. } | Statement::Delete { key, .. } => {
                Self::check_key(key)?
            }
            _ => {}
        }
        self.inner.execute(statement)
    }

    fn query(&mut self, query: &Query<'_>) -> Result<Vec<Row>> {
        match *query {
            Query::SelectValue { table, .. }
            | Query::KeyAt { table, .. }
            | Query::Keys { table }
            | Query::Entries { table }
            | Query::Count { table }
                if table.as_str() == "broken" =>
            {
                return Err(Error::Storage("broken table".into()));
            }
            Query::SelectValue { key: "dup", .. } => {
                return Ok(vec![
                    Row::single("value", ColumnValue::Text("first".into())),
                    Row::single("value", ColumnValue::Text("second".into())),
                ]);
            }
            Query::SelectValue { key, .. } => Self::check_key(key)?,
            _ => {}
        }
        self.inner.query(query)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Initialized store over [`FaultyBackend`].
pub fn faulty_store(table: &str) -> Store<FaultyBackend> {
    init_tracing();
    let store = Store::builder()
        .build_with::<FaultyBackend>()
        .expect("store config");
    assert!(store.init("faulty.db", table));
    store
}
