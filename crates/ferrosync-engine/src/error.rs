//! Error types for the copy engine

use ferrosync_config::ConfigError;
use ferrosync_model::{SourceError, StorageError};
use ferrosync_types::Error as FerrosyncError;
use thiserror::Error;

/// Boxed cause of a failed write
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to copy a single object
#[derive(Error, Debug)]
pub enum CopyError {
    /// Checking the target failed for a reason other than absence
    #[error("Failed to check target key '{target_key}': {source}")]
    TargetProbeFailed {
        /// Key probed in the target bucket
        target_key: String,
        /// Backend error
        source: StorageError,
    },

    /// Loading, addressing or writing the object failed
    #[error("Failed to store object {relative_path}: {source}")]
    WriteFailed {
        /// Relative path of the object
        relative_path: String,
        /// Original cause
        source: BoxError,
    },

    /// A cancellation signal aborted the object
    #[error("Copy cancelled")]
    Cancelled,
}

impl CopyError {
    /// Wrap a cause as a write failure
    pub fn write_failed<P, E>(relative_path: P, source: E) -> Self
    where
        P: Into<String>,
        E: Into<BoxError>,
    {
        Self::WriteFailed {
            relative_path: relative_path.into(),
            source: source.into(),
        }
    }

    /// Whether the object was aborted by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Write failure for a source error, or cancellation if the source was cancelled
    pub(crate) fn from_source(relative_path: &str, error: SourceError) -> Self {
        if error.storage_error().is_some_and(StorageError::is_cancelled) {
            Self::Cancelled
        } else {
            Self::write_failed(relative_path, error)
        }
    }

    /// Write failure for a backend error, or cancellation
    pub(crate) fn from_storage(relative_path: &str, error: StorageError) -> Self {
        if error.is_cancelled() {
            Self::Cancelled
        } else {
            Self::write_failed(relative_path, error)
        }
    }
}

/// Failure to set up a target before any object is copied
#[derive(Error, Debug)]
pub enum TargetError {
    /// Target configuration is incomplete or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Target bucket does not exist
    #[error("Target bucket {bucket} does not exist")]
    BucketMissing {
        /// Bucket name
        bucket: String,
    },

    /// Backend failed while checking the target
    #[error("Failed to check target bucket {bucket}: {source}")]
    Backend {
        /// Bucket name
        bucket: String,
        /// Backend error
        source: StorageError,
    },
}

impl From<CopyError> for FerrosyncError {
    fn from(error: CopyError) -> Self {
        match error {
            CopyError::Cancelled => FerrosyncError::Cancelled,
            other => FerrosyncError::copy(other.to_string()),
        }
    }
}

impl From<TargetError> for FerrosyncError {
    fn from(error: TargetError) -> Self {
        match error {
            TargetError::Config(config) => config.into(),
            other => FerrosyncError::config(other.to_string()),
        }
    }
}
