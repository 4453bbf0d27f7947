//! Error types for the plugin registry and configuration loading

use ferrosync_types::Error as FerrosyncError;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// URI is missing the plugin's prefix or does not match its grammar
    #[error("Invalid URI '{uri}': {reason}")]
    InvalidUri {
        /// The offending URI
        uri: String,
        /// Why it was rejected
        reason: String,
    },

    /// Operation requested on a plugin that does not support it
    #[error("{type_name} does not support {operation}")]
    UnsupportedOperation {
        /// Plugin configuration type
        type_name: String,
        /// Name of the unsupported operation
        operation: &'static str,
    },

    /// No registered plugin matches the lookup key
    #[error("No {kind} plugin matches '{key}'")]
    NoMatchingPlugin {
        /// "storage" or "filter"
        kind: &'static str,
        /// URI or CLI name used for the lookup
        key: String,
    },

    /// Plugin declaration is malformed and no wrapper can be built for it
    #[error("Invalid plugin definition for {type_name}: {message}")]
    InvalidPluginDefinition {
        /// Plugin configuration type
        type_name: String,
        /// What is wrong with the declaration
        message: String,
    },

    /// Configuration instance handed to a wrapper of another type
    #[error("Configuration type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Type the wrapper describes
        expected: String,
        /// Type of the instance
        actual: String,
    },

    /// I/O error when reading configuration file
    #[error("I/O error reading config file '{path}': {source}")]
    Io {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    Validation {
        /// Validation error message
        message: String,
    },

    /// Missing required configuration
    #[error("Missing required configuration: {key}")]
    MissingRequired {
        /// Configuration key that is missing
        key: String,
    },

    /// Invalid configuration value
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },

    /// Generic configuration error
    #[error("Configuration error: {message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Reasons a plugin candidate could not be turned into a definition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginLoadError {
    /// Candidate is declared but its definition cannot be found
    #[error("plugin type '{type_name}' is declared but not available")]
    NotFound {
        /// Plugin configuration type
        type_name: String,
    },
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        Self::Other {
            message: error.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(error: config::ConfigError) -> Self {
        Self::Other {
            message: error.to_string(),
        }
    }
}

impl From<ConfigError> for FerrosyncError {
    fn from(error: ConfigError) -> Self {
        FerrosyncError::config(error.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create a new invalid URI error
    pub fn invalid_uri<U: Into<String>, R: Into<String>>(uri: U, reason: R) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid plugin definition error
    pub fn invalid_definition<T: Into<String>, M: Into<String>>(type_name: T, message: M) -> Self {
        Self::InvalidPluginDefinition {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new missing required error
    pub fn missing_required<S: Into<String>>(key: S) -> Self {
        Self::MissingRequired { key: key.into() }
    }

    /// Create a new invalid value error
    pub fn invalid_value<K: Into<String>, M: Into<String>>(key: K, message: M) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts_to_config_kind() {
        let error: FerrosyncError = ConfigError::missing_required("target-bucket").into();
        assert!(error.is_config());
        assert!(error.to_string().contains("target-bucket"));
    }

    #[test]
    fn test_load_failure_display() {
        let error = PluginLoadError::NotFound {
            type_name: "AtmosConfig".to_string(),
        };
        let error = ConfigError::invalid_definition("AtmosConfig", error.to_string());
        assert!(matches!(error, ConfigError::InvalidPluginDefinition { .. }));
        assert!(error.to_string().contains("declared but not available"));
    }
}
