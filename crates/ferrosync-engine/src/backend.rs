//! Write access to bucket storage

use async_trait::async_trait;
use ferrosync_model::{full_path, ObjectReader, StorageError};
use std::fmt;

/// Server-side copy of one object into a target bucket
///
/// The source namespace is carried separately from the target addressing
/// because source and target may belong to different namespaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyObjectRequest {
    /// Namespace owning the source bucket
    pub source_namespace: Option<String>,
    /// Source bucket
    pub source_bucket: String,
    /// Source key
    pub source_key: String,
    /// Target bucket
    pub target_bucket: String,
    /// Target key
    pub target_key: String,
}

impl fmt::Display for CopyObjectRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}",
            self.source_namespace.as_deref().unwrap_or_default(),
            full_path(&self.source_bucket, &self.source_key),
            full_path(&self.target_bucket, &self.target_key)
        )
    }
}

/// Result of a completed copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyObjectResult {
    /// Integrity tag of the written object
    pub etag: Option<String>,
}

/// Bucket storage a target writes into
///
/// Metadata probes go through [`ObjectReader::read_metadata`], which must
/// report a missing object as [`StorageError::NotFound`]. A backend that
/// observes a cancellation signal reports [`StorageError::Cancelled`].
#[async_trait]
pub trait ObjectBackend: ObjectReader {
    /// Copy an object server-side
    async fn copy_object(
        &self,
        request: &CopyObjectRequest,
    ) -> Result<CopyObjectResult, StorageError>;

    /// Whether a bucket exists and is accessible
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_display() {
        let request = CopyObjectRequest {
            source_namespace: Some("ns1".into()),
            source_bucket: "photos".into(),
            source_key: "2024/cat.jpg".into(),
            target_bucket: "archive".into(),
            target_key: "backup/2024/cat.jpg".into(),
        };
        assert_eq!(
            request.to_string(),
            "ns1:photos/2024/cat.jpg -> archive/backup/2024/cat.jpg"
        );
    }
}
