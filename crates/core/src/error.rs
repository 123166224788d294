//! Error types for localstore.
//!
//! Every crate in the workspace reports failures through [`Error`]. The
//! variants line up with the failure classes a caller can observe:
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | `NotInitialized` | A store operation runs before a successful `init` |
//! | `InvalidState` | A task is submitted to a worker that is not running |
//! | `Open` | The backend could not be opened or created |
//! | `TaskFailed` | A queued task returned an error or panicked |
//! | `Storage` | The backend rejected a statement or query |

use std::time::Duration;
use thiserror::Error;

/// All localstore errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Store operation called before a successful `init`
    #[error("store is not initialized")]
    NotInitialized,

    /// Operation not valid in the current lifecycle state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Backend could not be opened or created
    #[error("failed to open backend: {0}")]
    Open(String),

    /// A task failed on the worker thread
    #[error("task failed: {0}")]
    TaskFailed(String),

    /// Backend statement or query error
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid caller-supplied input (table name, config value)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be parsed
    #[error("config error: {0}")]
    Config(String),

    /// A timed synchronous call gave up waiting
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for localstore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error means the store was used before `init`.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Error::NotInitialized)
    }

    /// Check if this error is a lifecycle violation.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::InvalidState(_))
    }

    /// Check if this error came from a failed task body.
    pub fn is_task_failure(&self) -> bool {
        matches!(self, Error::TaskFailed(_))
    }
}
