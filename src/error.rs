//! Error types for the TimeVouch client.

use crate::types::DigestParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Filesystem-side errors: the tree could not be read.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No such file or directory: {0:?}")]
    NotFound(PathBuf),

    #[error("Is not a walkable directory: {0:?}")]
    NotWalkable(PathBuf),

    #[error("Digest for {0:?} was not composed before its parent")]
    MissingChildDigest(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Read {
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced by registration operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a structured 4xx error. User-actionable.
    #[error("Registration rejected ({status}): {error}: {message}")]
    RegistrationRejected {
        status: u16,
        error: String,
        message: String,
    },

    /// Anything else that went wrong on the wire.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid digest: {0}")]
    InvalidDigest(#[from] DigestParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// True for failures that came from the filesystem rather than the service.
    pub fn is_storage(&self) -> bool {
        matches!(self, ApiError::Storage(_))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
