//! Core types for the key-value store
//!
//! - [`TableName`]: validated identifier for the backing table
//! - [`KeyValueRecord`]: one `(key, value)` row

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a table name
pub const MAX_TABLE_NAME_LEN: usize = 64;

/// Name of the table holding the key-value rows
///
/// Table names are spliced into statement text, so only plain SQL
/// identifiers are accepted: an ASCII letter or underscore followed by
/// ASCII letters, digits or underscores.
///
/// # Examples
///
/// ```
/// use localstore_core::TableName;
///
/// let table = TableName::new("data").unwrap();
/// assert_eq!(table.as_str(), "data");
///
/// assert!(TableName::new("data; drop table x").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Validate and wrap a table name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidInput("table name is empty".into()));
        }
        if name.len() > MAX_TABLE_NAME_LEN {
            return Err(Error::InvalidInput(format!(
                "table name exceeds {} bytes",
                MAX_TABLE_NAME_LEN
            )));
        }
        let mut chars = name.chars();
        let first_ok = chars
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false);
        if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::InvalidInput(format!(
                "table name '{}' is not a plain identifier",
                name
            )));
        }
        Ok(TableName(name))
    }

    /// Borrow the name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TableName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TableName::new(value)
    }
}

impl From<TableName> for String {
    fn from(value: TableName) -> Self {
        value.0
    }
}

/// A single key-value row
///
/// `key` is unique within a table; `value` is freely replaceable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueRecord {
    /// Primary key
    pub key: String,
    /// Stored value
    pub value: String,
}

impl KeyValueRecord {
    /// Create a record
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
