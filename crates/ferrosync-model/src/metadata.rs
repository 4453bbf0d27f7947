//! Object metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content checksum as reported by the storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    /// Algorithm name, e.g. `MD5`
    pub algorithm: String,
    /// Hex-encoded value
    pub value: String,
}

impl Checksum {
    /// Create a checksum
    pub fn new<A: Into<String>, V: Into<String>>(algorithm: A, value: V) -> Self {
        Self {
            algorithm: algorithm.into(),
            value: value.into(),
        }
    }
}

/// A user metadata entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    /// Metadata value
    pub value: String,
    /// Whether the storage indexes this entry for queries
    #[serde(default)]
    pub indexed: bool,
}

/// System and user metadata of a sync object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMetadata {
    /// Content size in bytes
    pub content_length: u64,
    /// Last modification time, when the storage reports one
    pub modification_time: Option<DateTime<Utc>>,
    /// MIME type
    #[serde(default)]
    pub content_type: Option<String>,
    /// Content checksum
    #[serde(default)]
    pub checksum: Option<Checksum>,
    /// Cache-Control header
    #[serde(default)]
    pub cache_control: Option<String>,
    /// Content-Disposition header
    #[serde(default)]
    pub content_disposition: Option<String>,
    /// Content-Encoding header
    #[serde(default)]
    pub content_encoding: Option<String>,
    /// HTTP Expires header
    #[serde(default)]
    pub http_expires: Option<DateTime<Utc>>,
    /// Expiration time
    #[serde(default)]
    pub expiration_time: Option<DateTime<Utc>>,
    /// User metadata by key
    #[serde(default)]
    pub user_metadata: BTreeMap<String, UserMetadata>,
}

impl SyncMetadata {
    /// Metadata with a size and modification time
    pub fn new(content_length: u64, modification_time: Option<DateTime<Utc>>) -> Self {
        Self {
            content_length,
            modification_time,
            ..Self::default()
        }
    }

    /// Set the content type
    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the checksum
    pub fn with_checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = Some(checksum);
        self
    }

    /// Add a user metadata entry
    pub fn with_user_metadata<K: Into<String>, V: Into<String>>(
        mut self,
        key: K,
        value: V,
        indexed: bool,
    ) -> Self {
        self.set_user_metadata(key, value, indexed);
        self
    }

    /// Insert or replace a user metadata entry
    pub fn set_user_metadata<K: Into<String>, V: Into<String>>(
        &mut self,
        key: K,
        value: V,
        indexed: bool,
    ) {
        self.user_metadata.insert(
            key.into(),
            UserMetadata {
                value: value.into(),
                indexed,
            },
        );
    }

    /// Value of a user metadata entry
    pub fn user_metadata_value(&self, key: &str) -> Option<&str> {
        self.user_metadata.get(key).map(|m| m.value.as_str())
    }
}
