//! Error type shared by every storage backend.
//!
//! "Key not found" is not an error: lookups return `Ok(None)`.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error from a native backend, kept as the error source.
pub type NativeError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Storage operation errors.
#[derive(Error, Debug)]
pub enum Error {
    /// The directory could not be created or the store refused to open.
    #[error("failed to open store at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: NativeError,
    },

    /// Shutting the store down failed.
    #[error("failed to close store at {}: {source}", path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: NativeError,
    },

    /// A batch created by a different kind of engine was passed to `commit`.
    #[error("invalid batch type {0}")]
    InvalidBatchType(&'static str),

    /// Any other failure reported by the underlying store.
    #[error("storage error: {0}")]
    Native(#[source] NativeError),

    /// The engine has already been closed.
    #[error("engine is closed")]
    Closed,

    /// The snapshot or iterator has already been released.
    #[error("{0} already released")]
    Released(&'static str),

    #[error("no storage driver registered as {0:?}")]
    UnknownDriver(String),

    #[error("storage driver {0:?} is already registered")]
    DuplicateDriver(String),
}

impl Error {
    /// Wraps a backend error as [`Error::Native`].
    pub fn native<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Native(Box::new(err))
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, Error>;
