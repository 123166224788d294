//! SQLite backend
//!
//! Each store name maps to one database file under the configured data
//! directory. The table layout is `(key TEXT PRIMARY KEY, value TEXT)`;
//! creation order is SQLite's implicit `rowid`, which `REPLACE` reassigns
//! when it rewrites an existing key.

use crate::backend::{Backend, ColumnValue, Query, Row, Statement};
use localstore_core::{Error, Result, StoreConfig};
use rusqlite::types::{ToSql, ValueRef};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// File-backed backend using an embedded SQLite engine.
pub struct SqliteBackend {
    /// `None` once closed
    conn: Option<Connection>,
    path: PathBuf,
}

fn storage_err(e: rusqlite::Error) -> Error {
    Error::Storage(e.to_string())
}

impl SqliteBackend {
    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| Error::InvalidState("backend is closed".into()))
    }

    fn collect_rows(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<Row>> {
        let mut stmt = conn.prepare(sql).map_err(storage_err)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params).map_err(storage_err)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(storage_err)? {
            let mut columns = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                let value = match row.get_ref(i).map_err(storage_err)? {
                    ValueRef::Null => ColumnValue::Null,
                    ValueRef::Integer(n) => ColumnValue::Integer(n),
                    ValueRef::Real(f) => ColumnValue::Real(f),
                    ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                        ColumnValue::Text(String::from_utf8_lossy(bytes).into_owned())
                    }
                };
                columns.push((name.clone(), value));
            }
            out.push(Row::new(columns));
        }
        Ok(out)
    }
}

impl Backend for SqliteBackend {
    fn open(config: &StoreConfig, name: &str) -> Result<Self> {
        let path = config.database_path(name)?;
        if !config.data_dir.is_dir() {
            if !config.create_dirs {
                return Err(Error::Open(format!(
                    "data directory {} does not exist",
                    config.data_dir.display()
                )));
            }
            std::fs::create_dir_all(&config.data_dir).map_err(|e| {
                Error::Open(format!(
                    "cannot create data directory {}: {}",
                    config.data_dir.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(&path)
            .map_err(|e| Error::Open(format!("{}: {}", path.display(), e)))?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(|e| Error::Open(e.to_string()))?;
        debug!(path = %path.display(), "sqlite backend opened");

        Ok(Self {
            conn: Some(conn),
            path,
        })
    }

    fn execute(&mut self, statement: &Statement<'_>) -> Result<usize> {
        let conn = self.conn()?;
        let affected = match *statement {
            Statement::CreateTable { table } => conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {}(key TEXT PRIMARY KEY,value TEXT)",
                    table
                ),
                [],
            ),
            Statement::Upsert { table, key, value } => conn.execute(
                &format!("REPLACE INTO {}(key,value) VALUES(?1,?2)", table),
                params![key, value],
            ),
            Statement::Delete { table, key } => conn.execute(
                &format!("DELETE FROM {} WHERE key=?1", table),
                params![key],
            ),
            Statement::Clear { table } => conn.execute(&format!("DELETE FROM {}", table), []),
        };
        affected.map_err(storage_err)
    }

    fn query(&mut self, query: &Query<'_>) -> Result<Vec<Row>> {
        let conn = self.conn()?;
        match *query {
            Query::SelectValue { table, key } => Self::collect_rows(
                conn,
                &format!("SELECT value FROM {} WHERE key=?1", table),
                params![key],
            ),
            Query::KeyAt { table, index } => {
                // An index beyond i64 cannot address a row.
                let Ok(offset) = i64::try_from(index) else {
                    return Ok(Vec::new());
                };
                Self::collect_rows(
                    conn,
                    &format!(
                        "SELECT key FROM {} ORDER BY rowid ASC LIMIT 1 OFFSET ?1",
                        table
                    ),
                    params![offset],
                )
            }
            Query::Keys { table } => Self::collect_rows(
                conn,
                &format!("SELECT key FROM {} ORDER BY rowid ASC", table),
                params![],
            ),
            Query::Entries { table } => Self::collect_rows(
                conn,
                &format!("SELECT key,value FROM {} ORDER BY rowid ASC", table),
                params![],
            ),
            Query::Count { table } => Self::collect_rows(
                conn,
                &format!("SELECT count(*) AS nums FROM {}", table),
                params![],
            ),
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| storage_err(e))?;
            debug!(path = %self.path.display(), "sqlite backend closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.conn.is_none()
    }
}
