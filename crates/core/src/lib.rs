//! Core types for localstore
//!
//! This crate defines the vocabulary shared by every other crate:
//! - [`Error`] / [`Result`]: the error taxonomy for store, worker and backend
//! - [`TableName`]: validated SQL identifier for the key-value table
//! - [`KeyValueRecord`]: a single `(key, value)` row
//! - [`StoreConfig`]: file-loadable store configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod types;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use types::{KeyValueRecord, TableName};
