//! Sync object model for FerroSync
//!
//! Sources produce [`SyncObject`]s; targets consume them. An object knows
//! where it lives, its path relative to the source root and how to load its
//! metadata and content through an [`ObjectReader`].
//!
//! # Examples
//!
//! ```rust
//! use ferrosync_config::FilesystemConfig;
//! use ferrosync_model::FilesystemSource;
//! use ferrosync_types::BufferSize;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FilesystemConfig::for_path("/var/data");
//! let source = FilesystemSource::new(&config, BufferSize::default())?;
//! for object in source.objects() {
//!     let mut object = object?;
//!     let size = object.metadata().await?.content_length;
//!     println!("{} ({} bytes)", object.relative_path(), size);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod filesystem;
pub mod metadata;
pub mod object;
pub mod reader;

pub use error::{SourceError, StorageError};
pub use filesystem::{FilesystemReader, FilesystemSource, METADATA_DIR};
pub use metadata::{Checksum, SyncMetadata, UserMetadata};
pub use object::{full_path, ObjectKind, ObjectLocation, SyncObject};
pub use reader::{ContentStream, ObjectReader};
