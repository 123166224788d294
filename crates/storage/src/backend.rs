//! Backend trait and the statement/query/row model.
//!
//! Every backend stores rows of `(key TEXT PRIMARY KEY, value TEXT)` and
//! remembers the order in which rows were created. Upserts replace: the old
//! row for a key is removed and a fresh row is created, so a rewritten key
//! moves to the end of creation order.

use localstore_core::{Result, StoreConfig, TableName};

/// A persistent engine holding key-value tables.
pub trait Backend: Send + Sized + 'static {
    /// Open or create the store called `name`.
    ///
    /// Fails with [`localstore_core::Error::Open`] when the storage
    /// environment is unavailable.
    fn open(config: &StoreConfig, name: &str) -> Result<Self>;

    /// Run a mutating statement, returning the number of affected rows.
    fn execute(&mut self, statement: &Statement<'_>) -> Result<usize>;

    /// Run a query, returning rows in result order.
    fn query(&mut self, query: &Query<'_>) -> Result<Vec<Row>>;

    /// Release the engine. Idempotent.
    ///
    /// After `close`, `execute` and `query` fail with `InvalidState`.
    fn close(&mut self) -> Result<()>;

    /// Whether `close` has run.
    fn is_closed(&self) -> bool;
}

/// Mutating statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement<'a> {
    /// Create the table if it does not exist
    CreateTable {
        /// Target table
        table: &'a TableName,
    },
    /// Insert a row, replacing any existing row with the same key
    Upsert {
        /// Target table
        table: &'a TableName,
        /// Row key
        key: &'a str,
        /// Row value
        value: &'a str,
    },
    /// Delete the row for a key, if present
    Delete {
        /// Target table
        table: &'a TableName,
        /// Row key
        key: &'a str,
    },
    /// Delete every row
    Clear {
        /// Target table
        table: &'a TableName,
    },
}

/// Read-only queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    /// Values stored under `key`; column `value`
    SelectValue {
        /// Target table
        table: &'a TableName,
        /// Row key
        key: &'a str,
    },
    /// The key at zero-based creation-order position `index`; column `key`
    KeyAt {
        /// Target table
        table: &'a TableName,
        /// Zero-based position
        index: usize,
    },
    /// Every key in creation order; column `key`
    Keys {
        /// Target table
        table: &'a TableName,
    },
    /// Every row in creation order; columns `key`, `value`
    Entries {
        /// Target table
        table: &'a TableName,
    },
    /// Row count; single row, column `nums`
    Count {
        /// Target table
        table: &'a TableName,
    },
}

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// SQL NULL
    Null,
    /// Integer column
    Integer(i64),
    /// Floating point column
    Real(f64),
    /// Text column
    Text(String),
}

/// One result row: named columns in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(String, ColumnValue)>,
}

impl Row {
    /// Build a row from `(name, value)` pairs
    pub fn new(columns: Vec<(String, ColumnValue)>) -> Self {
        Self { columns }
    }

    /// Single-column row
    pub fn single(name: &str, value: ColumnValue) -> Self {
        Self {
            columns: vec![(name.to_string(), value)],
        }
    }

    /// Look up a column by name
    pub fn get(&self, name: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Text column by name; `None` when absent or not text
    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(ColumnValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Integer column by name; `None` when absent or not an integer
    pub fn get_integer(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(ColumnValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
