//! Error types for storage access and sync objects

use ferrosync_types::Error as FerrosyncError;
use std::fmt::Display;
use thiserror::Error;

/// Failure reported by a storage reader or backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// The addressed object does not exist
    #[error("Object not found: {location}")]
    NotFound {
        /// Object location
        location: String,
    },

    /// Local I/O failure
    #[error("I/O error on {location}: {source}")]
    Io {
        /// Object location
        location: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Remote storage answered with an error status
    #[error("Storage returned status {status} for {location}: {message}")]
    Status {
        /// Object location
        location: String,
        /// HTTP-style status code
        status: u16,
        /// Error message from the storage
        message: String,
    },

    /// Location kind this reader cannot serve
    #[error("Location {location} is not supported by this reader")]
    UnsupportedLocation {
        /// Object location
        location: String,
    },

    /// Metadata exists but could not be decoded
    #[error("Invalid metadata for {location}: {message}")]
    InvalidMetadata {
        /// Object location
        location: String,
        /// Decoding error
        message: String,
    },

    /// Operation aborted by a cancellation signal
    #[error("Storage operation cancelled")]
    Cancelled,
}

impl StorageError {
    /// Map an I/O error, turning `NotFound` into [`StorageError::NotFound`]
    pub fn io<L: Display>(location: L, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                location: location.to_string(),
            }
        } else {
            Self::Io {
                location: location.to_string(),
                source: error,
            }
        }
    }

    /// Create a not-found error
    pub fn not_found<L: Display>(location: L) -> Self {
        Self::NotFound {
            location: location.to_string(),
        }
    }

    /// Whether the object simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the operation was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failure of a sync object to provide its metadata or content
#[derive(Error, Debug)]
pub enum SourceError {
    /// Lazy metadata load failed
    #[error("Failed to load metadata for {identifier}: {source}")]
    MetadataUnavailable {
        /// Object identifier
        identifier: String,
        /// Underlying storage error
        source: StorageError,
    },

    /// Content stream could not be opened
    #[error("Failed to open content of {identifier}: {source}")]
    ContentUnavailable {
        /// Object identifier
        identifier: String,
        /// Underlying storage error
        source: StorageError,
    },

    /// Source listing failed
    #[error("Failed to list {root}: {message}")]
    Listing {
        /// Listing root
        root: String,
        /// Error message
        message: String,
    },
}

impl SourceError {
    /// Underlying storage error, if any
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            Self::MetadataUnavailable { source, .. } | Self::ContentUnavailable { source, .. } => {
                Some(source)
            }
            Self::Listing { .. } => None,
        }
    }
}

impl From<SourceError> for FerrosyncError {
    fn from(error: SourceError) -> Self {
        FerrosyncError::source_error(error.to_string())
    }
}

impl From<StorageError> for FerrosyncError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Cancelled => FerrosyncError::Cancelled,
            other => FerrosyncError::source_error(other.to_string()),
        }
    }
}
