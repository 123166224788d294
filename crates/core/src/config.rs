//! Store configuration
//!
//! [`StoreConfig`] can be built in code, or loaded from TOML:
//!
//! ```toml
//! data_dir = "/var/lib/game"
//! create_dirs = false
//! worker_name = "save-worker"
//! busy_timeout_ms = 2000
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default worker thread name
pub const DEFAULT_WORKER_NAME: &str = "localstore-worker";

/// Default SQLite busy timeout in milliseconds
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Configuration for opening a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the database files
    pub data_dir: PathBuf,
    /// Create `data_dir` when it does not exist
    ///
    /// With `false`, a missing directory means the storage environment is
    /// unavailable and `init` reports failure.
    pub create_dirs: bool,
    /// Name given to the worker thread
    pub worker_name: String,
    /// How long the backend waits on a locked database file
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            create_dirs: true,
            worker_name: DEFAULT_WORKER_NAME.to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Check field values
    pub fn validate(&self) -> Result<()> {
        if self.worker_name.is_empty() {
            return Err(Error::Config("worker_name must not be empty".into()));
        }
        if self.worker_name.contains('\0') {
            return Err(Error::Config("worker_name must not contain NUL".into()));
        }
        Ok(())
    }

    /// Full path of the database file for a store name.
    ///
    /// `name` must be a bare file name; anything that could resolve outside
    /// `data_dir` is an `Open` error.
    pub fn database_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() {
            return Err(Error::Open("store name is empty".into()));
        }
        if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
            return Err(Error::Open(format!(
                "store name {:?} must be a bare file name",
                name
            )));
        }
        Ok(self.data_dir.join(name))
    }
}
