//! Local filesystem source
//!
//! [`FilesystemSource`] walks a file or directory tree described by a
//! [`FilesystemConfig`] and yields one [`SyncObject`] per entry. Metadata is
//! read lazily through [`FilesystemReader`].

use crate::error::{SourceError, StorageError};
use crate::metadata::SyncMetadata;
use crate::object::{ObjectKind, ObjectLocation, SyncObject};
use crate::reader::{ContentStream, ObjectReader};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ferrosync_config::{ConfigError, ConfigResult, FilesystemConfig};
use ferrosync_types::BufferSize;
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory holding preserved metadata sidecars, skipped while walking
pub const METADATA_DIR: &str = ".ferrosync-meta";

/// Reads metadata and content of local files
#[derive(Debug, Clone)]
pub struct FilesystemReader {
    buffer_size: usize,
    follow_links: bool,
    store_metadata: bool,
}

impl FilesystemReader {
    /// Reader with the given stream buffer size
    pub fn new(buffer_size: BufferSize) -> Self {
        Self {
            buffer_size: buffer_size.get(),
            follow_links: false,
            store_metadata: false,
        }
    }

    /// Reader configured like a filesystem plugin
    pub fn from_config(config: &FilesystemConfig, buffer_size: BufferSize) -> Self {
        Self {
            buffer_size: buffer_size.get(),
            follow_links: config.follow_links,
            store_metadata: config.store_metadata,
        }
    }

    /// Sidecar file holding preserved metadata of `path`
    pub fn sidecar_path(path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?;
        let mut sidecar = name.to_os_string();
        sidecar.push(".json");
        Some(
            path.parent()
                .unwrap_or_else(|| Path::new(""))
                .join(METADATA_DIR)
                .join(sidecar),
        )
    }

    async fn read_sidecar(&self, path: &Path) -> Result<Option<SyncMetadata>, StorageError> {
        let Some(sidecar) = Self::sidecar_path(path) else {
            return Ok(None);
        };
        match tokio::fs::read(&sidecar).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                StorageError::InvalidMetadata {
                    location: sidecar.display().to_string(),
                    message: e.to_string(),
                }
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(sidecar.display(), e)),
        }
    }

    fn local_path(location: &ObjectLocation) -> Result<&Path, StorageError> {
        match location {
            ObjectLocation::Path(path) => Ok(path),
            other => Err(StorageError::UnsupportedLocation {
                location: other.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ObjectReader for FilesystemReader {
    async fn read_metadata(&self, location: &ObjectLocation) -> Result<SyncMetadata, StorageError> {
        let path = Self::local_path(location)?;
        let fs_metadata = if self.follow_links {
            tokio::fs::metadata(path).await
        } else {
            tokio::fs::symlink_metadata(path).await
        };
        let fs_metadata = fs_metadata.map_err(|e| StorageError::io(path.display(), e))?;

        let mut metadata = if self.store_metadata {
            self.read_sidecar(path).await?.unwrap_or_default()
        } else {
            SyncMetadata::default()
        };
        metadata.content_length = if fs_metadata.is_dir() {
            0
        } else {
            fs_metadata.len()
        };
        metadata.modification_time = fs_metadata.modified().ok().map(DateTime::<Utc>::from);
        Ok(metadata)
    }

    async fn open(&self, location: &ObjectLocation) -> Result<ContentStream, StorageError> {
        let path = Self::local_path(location)?;
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| StorageError::io(path.display(), e))?;
        Ok(Box::new(file))
    }

    fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

/// Source listing a local file or directory tree
#[derive(Debug)]
pub struct FilesystemSource {
    root: PathBuf,
    root_is_dir: bool,
    follow_links: bool,
    use_absolute_path: bool,
    excluded: Vec<Regex>,
    modified_since: Option<DateTime<Utc>>,
    reader: Arc<FilesystemReader>,
}

impl FilesystemSource {
    /// Build a source from a filesystem plugin configuration
    pub fn new(config: &FilesystemConfig, buffer_size: BufferSize) -> ConfigResult<Self> {
        let root = config
            .path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::missing_required("path"))?;
        if !root.exists() {
            return Err(ConfigError::invalid_value(
                "path",
                format!("{} does not exist", root.display()),
            ));
        }

        let excluded = config
            .excluded_paths
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|e| ConfigError::invalid_value("excluded-paths", e.to_string()))
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        debug!(
            "Filesystem source at {} with {} exclusions",
            root.display(),
            excluded.len()
        );

        Ok(Self {
            root_is_dir: root.is_dir(),
            root,
            follow_links: config.follow_links,
            use_absolute_path: config.use_absolute_path,
            excluded,
            modified_since: config.modified_since_time()?,
            reader: Arc::new(FilesystemReader::from_config(config, buffer_size)),
        })
    }

    /// Root of the tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reader shared by every object of this source
    pub fn reader(&self) -> Arc<FilesystemReader> {
        Arc::clone(&self.reader)
    }

    /// Whether a path matches one of the exclusion patterns
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.excluded.iter().any(|pattern| pattern.is_match(&path))
    }

    /// Objects below the root in walk order
    ///
    /// Excluded directories are not descended into. Files older than
    /// `modified_since` are left out; directories are always listed.
    pub fn objects(&self) -> impl Iterator<Item = Result<SyncObject, SourceError>> + '_ {
        let reader: Arc<dyn ObjectReader> = self.reader.clone();
        WalkDir::new(&self.root)
            .follow_links(self.follow_links)
            .min_depth(usize::from(self.root_is_dir))
            .into_iter()
            .filter_entry(move |entry| {
                let keep = entry.file_name() != METADATA_DIR && !self.is_excluded(entry.path());
                if !keep {
                    trace!("Excluding {}", entry.path().display());
                }
                keep
            })
            .filter_map(move |entry| match entry {
                Ok(entry) => self.to_object(&entry, &reader).map(Ok),
                Err(e) => {
                    warn!("Error walking {}: {}", self.root.display(), e);
                    Some(Err(SourceError::Listing {
                        root: self.root.display().to_string(),
                        message: e.to_string(),
                    }))
                }
            })
    }

    fn to_object(&self, entry: &DirEntry, reader: &Arc<dyn ObjectReader>) -> Option<SyncObject> {
        let kind = if entry.file_type().is_dir() {
            ObjectKind::Directory
        } else {
            ObjectKind::File
        };

        if kind == ObjectKind::File {
            if let Some(since) = self.modified_since {
                let modified = entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .map(DateTime::<Utc>::from);
                if modified.is_some_and(|m| m < since) {
                    trace!("Skipping {}, not modified since {}", entry.path().display(), since);
                    return None;
                }
            }
        }

        Some(SyncObject::new(
            Arc::clone(reader),
            ObjectLocation::Path(entry.path().to_path_buf()),
            self.relative_path(entry.path()),
            kind,
        ))
    }

    /// Path of an entry as stored in the target, `/`-separated
    pub fn relative_path(&self, path: &Path) -> String {
        let relative = if self.use_absolute_path {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        } else if self.root_is_dir {
            path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
        } else {
            path.file_name().map(PathBuf::from).unwrap_or_default()
        };

        relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}
