//! Error types for rescache

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rescache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error a [`ReleaseStrategy`](crate::ReleaseStrategy) may report
pub type ReleaseError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for rescache
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Release Errors
    // -------------------------------------------------------------------------
    /// The release strategy failed for an entry that has already been removed
    #[error("Failed to release cached resource {id}: {source}")]
    Release {
        id: String,
        #[source]
        source: ReleaseError,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid size '{0}': expected a byte count such as 4096, 512KiB or 64MB")]
    InvalidSize(String),

    // -------------------------------------------------------------------------
    // Registry Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file metadata '{path}': {source}")]
    FileMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize cache dump: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Check if this error came from a release strategy
    #[must_use]
    pub fn is_release_error(&self) -> bool {
        matches!(self, Error::Release { .. })
    }

    /// Check if this is a configuration error
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_) | Error::InvalidSize(_))
    }

    pub(crate) fn release(id: impl std::fmt::Debug, source: ReleaseError) -> Self {
        Error::Release {
            id: format!("{id:?}"),
            source,
        }
    }
}
