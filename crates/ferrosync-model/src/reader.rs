//! Storage read access

use crate::error::StorageError;
use crate::metadata::SyncMetadata;
use crate::object::ObjectLocation;
use async_trait::async_trait;
use ferrosync_types::BufferSize;
use std::fmt;
use tokio::io::AsyncRead;

/// Byte stream of an object's content
pub type ContentStream = Box<dyn AsyncRead + Send + Unpin>;

/// Read access to the storage a sync object lives in
///
/// Implementations must report a missing object as
/// [`StorageError::NotFound`]; callers rely on it to tell an absent target
/// from a failing one.
#[async_trait]
pub trait ObjectReader: Send + Sync + fmt::Debug {
    /// Fetch the metadata of the object at `location`
    async fn read_metadata(&self, location: &ObjectLocation) -> Result<SyncMetadata, StorageError>;

    /// Open the content of the object at `location`
    async fn open(&self, location: &ObjectLocation) -> Result<ContentStream, StorageError>;

    /// Buffer size used when wrapping content streams
    fn buffer_size(&self) -> usize {
        BufferSize::DEFAULT
    }
}
