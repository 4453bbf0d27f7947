//! Umbrella error type for FerroSync
//!
//! Each subsystem defines its own error enum (`ConfigError`, `SourceError`,
//! `CopyError`) close to the code that raises it. Those convert into [`Error`]
//! when they cross a crate boundary that only cares about the broad category,
//! such as the CLI or the run accounting.

/// Main error type for FerroSync operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// Configuration or plugin registry error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Reading from the source storage failed
    #[error("Source error: {message}")]
    Source {
        /// Error message describing the source issue
        message: String,
    },

    /// Writing an object to the target failed
    #[error("Copy error: {message}")]
    Copy {
        /// Error message describing the copy failure
        message: String,
    },

    /// Operation cancelled
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors
    Io,
    /// Configuration errors
    Config,
    /// Source storage errors
    Source,
    /// Target write errors
    Copy,
    /// Cancellation
    Cancelled,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::Config { .. } => ErrorKind::Config,
            Self::Source { .. } => ErrorKind::Source,
            Self::Copy { .. } => ErrorKind::Copy,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Configuration errors surface before any data movement begins
    pub fn is_config(&self) -> bool {
        self.kind() == ErrorKind::Config
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new source error
    pub fn source_error<S: Into<String>>(message: S) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a new copy error
    pub fn copy<S: Into<String>>(message: S) -> Self {
        Self::Copy {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_error_kind_consistency(message in ".*") {
            let errors = vec![
                (Error::Io { message: message.clone() }, ErrorKind::Io),
                (Error::config(message.clone()), ErrorKind::Config),
                (Error::source_error(message.clone()), ErrorKind::Source),
                (Error::copy(message.clone()), ErrorKind::Copy),
                (Error::other(message.clone()), ErrorKind::Other),
            ];

            for (error, kind) in errors {
                prop_assert_eq!(error.kind(), kind);
                prop_assert!(error.to_string().contains(&message));
            }
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "test file");
        let error = Error::from(io_error);

        assert_eq!(error.kind(), ErrorKind::Io);
        assert!(error.to_string().contains("test file"));
    }

    #[test]
    fn test_cancelled_error() {
        let error = Error::Cancelled;
        assert_eq!(error.kind(), ErrorKind::Cancelled);
        assert_eq!(error.to_string(), "Operation cancelled");
        assert!(!error.is_config());
    }
}
