//! In-process backend
//!
//! Rows live in a `Vec` per table, in creation order, so `KeyAt` and `Keys`
//! behave exactly like the SQLite backend's `rowid` ordering. Nothing is
//! persisted; the data is gone once the backend is dropped.

use crate::backend::{Backend, ColumnValue, Query, Row, Statement};
use localstore_core::{Error, Result, StoreConfig};
use std::collections::HashMap;

/// Volatile backend for tests and caches.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: HashMap<String, Vec<(String, String)>>,
    closed: bool,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::InvalidState("backend is closed".into()));
        }
        Ok(())
    }

    fn rows(&self, table: &str) -> Result<&Vec<(String, String)>> {
        self.tables
            .get(table)
            .ok_or_else(|| Error::Storage(format!("no such table: {}", table)))
    }

    fn rows_mut(&mut self, table: &str) -> Result<&mut Vec<(String, String)>> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| Error::Storage(format!("no such table: {}", table)))
    }
}

fn key_row(key: &str) -> Row {
    Row::single("key", ColumnValue::Text(key.to_string()))
}

impl Backend for MemoryBackend {
    fn open(_config: &StoreConfig, name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::Open("store name is empty".into()));
        }
        Ok(Self::new())
    }

    fn execute(&mut self, statement: &Statement<'_>) -> Result<usize> {
        self.check_open()?;
        match *statement {
            Statement::CreateTable { table } => {
                self.tables.entry(table.as_str().to_string()).or_default();
                Ok(0)
            }
            Statement::Upsert { table, key, value } => {
                let rows = self.rows_mut(table.as_str())?;
                rows.retain(|(k, _)| k != key);
                rows.push((key.to_string(), value.to_string()));
                Ok(1)
            }
            Statement::Delete { table, key } => {
                let rows = self.rows_mut(table.as_str())?;
                let before = rows.len();
                rows.retain(|(k, _)| k != key);
                Ok(before - rows.len())
            }
            Statement::Clear { table } => {
                let rows = self.rows_mut(table.as_str())?;
                let removed = rows.len();
                rows.clear();
                Ok(removed)
            }
        }
    }

    fn query(&mut self, query: &Query<'_>) -> Result<Vec<Row>> {
        self.check_open()?;
        match *query {
            Query::SelectValue { table, key } => Ok(self
                .rows(table.as_str())?
                .iter()
                .filter(|(k, _)| k == key)
                .map(|(_, v)| Row::single("value", ColumnValue::Text(v.clone())))
                .collect()),
            Query::KeyAt { table, index } => Ok(self
                .rows(table.as_str())?
                .get(index)
                .map(|(k, _)| vec![key_row(k)])
                .unwrap_or_default()),
            Query::Keys { table } => Ok(self
                .rows(table.as_str())?
                .iter()
                .map(|(k, _)| key_row(k))
                .collect()),
            Query::Entries { table } => Ok(self
                .rows(table.as_str())?
                .iter()
                .map(|(k, v)| {
                    Row::new(vec![
                        ("key".to_string(), ColumnValue::Text(k.clone())),
                        ("value".to_string(), ColumnValue::Text(v.clone())),
                    ])
                })
                .collect()),
            Query::Count { table } => {
                let len = self.rows(table.as_str())?.len();
                Ok(vec![Row::single(
                    "nums",
                    ColumnValue::Integer(i64::try_from(len).unwrap_or(i64::MAX)),
                )])
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
