//! Sync objects
//!
//! A [`SyncObject`] is one item flowing from a source to a target. Its
//! metadata is loaded lazily, at most once, through the [`ObjectReader`] of
//! the storage it came from.

use crate::error::SourceError;
use crate::metadata::SyncMetadata;
use crate::reader::{ContentStream, ObjectReader};
use once_cell::sync::Lazy;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{debug, trace};

static DIRECTORY_METADATA: Lazy<SyncMetadata> = Lazy::new(SyncMetadata::default);

/// `bucket/key`, the identifier of an object in bucket storage
pub fn full_path(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, key)
}

/// Where an object lives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectLocation {
    /// Object in bucket storage
    Bucket {
        /// Namespace owning the bucket, if the storage has namespaces
        namespace: Option<String>,
        /// Bucket name
        bucket: String,
        /// Object key
        key: String,
    },
    /// File or directory on a local filesystem
    Path(PathBuf),
}

impl ObjectLocation {
    /// Location in a bucket without namespace
    pub fn bucket<B: Into<String>, K: Into<String>>(bucket: B, key: K) -> Self {
        Self::Bucket {
            namespace: None,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Attach a namespace to a bucket location
    pub fn in_namespace<S: Into<String>>(self, namespace: S) -> Self {
        match self {
            Self::Bucket { bucket, key, .. } => Self::Bucket {
                namespace: Some(namespace.into()),
                bucket,
                key,
            },
            path => path,
        }
    }

    /// Bucket name, for bucket locations
    pub fn bucket_name(&self) -> Option<&str> {
        match self {
            Self::Bucket { bucket, .. } => Some(bucket),
            Self::Path(_) => None,
        }
    }

    /// Namespace, for bucket locations that carry one
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Bucket { namespace, .. } => namespace.as_deref(),
            Self::Path(_) => None,
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bucket {
                namespace: Some(namespace),
                bucket,
                key,
            } => write!(f, "{}:{}", namespace, full_path(bucket, key)),
            Self::Bucket { bucket, key, .. } => f.write_str(&full_path(bucket, key)),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Kind of a sync object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Regular object with content
    File,
    /// Directory or common prefix; has no content or metadata
    Directory,
    /// Delete marker of a versioned bucket
    DeleteMarker,
}

/// One item moving from a source to a target
#[derive(Debug)]
pub struct SyncObject {
    identifier: String,
    key: String,
    relative_path: String,
    kind: ObjectKind,
    location: ObjectLocation,
    target_identifier: Option<String>,
    metadata: Option<SyncMetadata>,
    reader: Arc<dyn ObjectReader>,
}

impl SyncObject {
    /// Object whose metadata is loaded on first access
    pub fn new<S: Into<String>>(
        reader: Arc<dyn ObjectReader>,
        location: ObjectLocation,
        relative_path: S,
        kind: ObjectKind,
    ) -> Self {
        let key = match &location {
            ObjectLocation::Bucket { key, .. } => key.clone(),
            ObjectLocation::Path(path) => path.to_string_lossy().into_owned(),
        };
        Self {
            identifier: location.to_string(),
            key,
            relative_path: relative_path.into(),
            kind,
            location,
            target_identifier: None,
            metadata: None,
            reader,
        }
    }

    /// Object in a bucket; keys ending in `/` are common prefixes
    pub fn in_bucket<B: Into<String>, K: Into<String>, S: Into<String>>(
        reader: Arc<dyn ObjectReader>,
        bucket: B,
        key: K,
        relative_path: S,
    ) -> Self {
        let key = key.into();
        let kind = if key.ends_with('/') {
            ObjectKind::Directory
        } else {
            ObjectKind::File
        };
        Self::new(reader, ObjectLocation::bucket(bucket, key), relative_path, kind)
    }

    /// Delete marker; its metadata comes from the version listing
    pub fn delete_marker<S: Into<String>>(
        reader: Arc<dyn ObjectReader>,
        location: ObjectLocation,
        relative_path: S,
        metadata: SyncMetadata,
    ) -> Self {
        let mut object = Self::new(reader, location, relative_path, ObjectKind::DeleteMarker);
        object.metadata = Some(metadata);
        object
    }

    /// Storage-specific identifier, e.g. `bucket/key`
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Key in the source storage
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Path relative to the source root
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Kind of the object
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Whether the object is a directory
    pub fn is_directory(&self) -> bool {
        self.kind == ObjectKind::Directory
    }

    /// Whether the object is a delete marker
    pub fn is_delete_marker(&self) -> bool {
        self.kind == ObjectKind::DeleteMarker
    }

    /// Source location
    pub fn location(&self) -> &ObjectLocation {
        &self.location
    }

    /// Reader of the storage the object came from
    pub fn reader(&self) -> &Arc<dyn ObjectReader> {
        &self.reader
    }

    /// Identifier of the object in the target, once computed
    pub fn target_identifier(&self) -> Option<&str> {
        self.target_identifier.as_deref()
    }

    /// Record the target identifier; only the first call has an effect
    pub fn set_target_identifier<S: Into<String>>(&mut self, identifier: S) -> bool {
        if self.target_identifier.is_some() {
            debug!(
                "Target identifier of {} already set, keeping {:?}",
                self.identifier, self.target_identifier
            );
            return false;
        }
        self.target_identifier = Some(identifier.into());
        true
    }

    /// Whether metadata is available without I/O
    pub fn is_metadata_loaded(&self) -> bool {
        self.metadata.is_some()
    }

    /// Metadata if already loaded
    pub fn loaded_metadata(&self) -> Option<&SyncMetadata> {
        if self.is_directory() {
            return Some(&DIRECTORY_METADATA);
        }
        self.metadata.as_ref()
    }

    /// Metadata, loading it on first access
    ///
    /// Directories return an empty record without touching the storage. A
    /// failed load leaves the object unloaded so a later call retries.
    pub async fn metadata(&mut self) -> Result<&SyncMetadata, SourceError> {
        if self.is_directory() {
            return Ok(&DIRECTORY_METADATA);
        }
        if self.metadata.is_none() {
            trace!("Loading metadata for {}", self.identifier);
            let loaded = self
                .reader
                .read_metadata(&self.location)
                .await
                .map_err(|source| SourceError::MetadataUnavailable {
                    identifier: self.identifier.clone(),
                    source,
                })?;
            self.metadata = Some(loaded);
        }
        Ok(self.metadata.get_or_insert_with(SyncMetadata::default))
    }

    /// Buffered content stream; `None` for directories and delete markers
    pub async fn content_stream(&self) -> Result<Option<ContentStream>, SourceError> {
        if self.kind != ObjectKind::File {
            return Ok(None);
        }
        let raw = self
            .reader
            .open(&self.location)
            .await
            .map_err(|source| SourceError::ContentUnavailable {
                identifier: self.identifier.clone(),
                source,
            })?;
        Ok(Some(Box::new(BufReader::with_capacity(
            self.reader.buffer_size(),
            raw,
        ))))
    }
}
