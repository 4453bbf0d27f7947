//! Shared utilities for FerroSync integration tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use ferrosync_engine::{CopyObjectRequest, CopyObjectResult, ObjectBackend};
use ferrosync_model::{
    full_path, ContentStream, ObjectLocation, ObjectReader, StorageError, SyncMetadata, SyncObject,
};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Failure injected into the in-memory store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Answer with an HTTP-style error status
    Status(u16),
    /// Behave as if the call observed a cancellation signal
    Cancelled,
}

impl Fault {
    fn into_error(self, location: &str) -> StorageError {
        match self {
            Self::Status(status) => StorageError::Status {
                location: location.to_string(),
                status,
                message: "injected failure".to_string(),
            },
            Self::Cancelled => StorageError::Cancelled,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    metadata: SyncMetadata,
    content: Vec<u8>,
}

/// Bucket storage kept in memory
///
/// Implements both [`ObjectReader`] and [`ObjectBackend`]. A copy stamps
/// the new object with the store's clock, like a real server would.
#[derive(Debug)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    buckets: Mutex<HashSet<String>>,
    metadata_faults: Mutex<HashMap<String, Fault>>,
    copy_fault: Mutex<Option<Fault>>,
    copy_requests: Mutex<Vec<CopyObjectRequest>>,
    metadata_reads: AtomicUsize,
    clock: Mutex<DateTime<Utc>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            buckets: Mutex::new(HashSet::new()),
            metadata_faults: Mutex::new(HashMap::new()),
            copy_fault: Mutex::new(None),
            copy_requests: Mutex::new(Vec::new()),
            metadata_reads: AtomicUsize::new(0),
            clock: Mutex::new(base_time() + Duration::days(1)),
        }
    }
}

impl MemoryStore {
    /// Store holding the given buckets
    pub fn with_buckets(buckets: &[&str]) -> Arc<Self> {
        let store = Self::default();
        for bucket in buckets {
            store.create_bucket(bucket);
        }
        Arc::new(store)
    }

    /// Create an empty bucket
    pub fn create_bucket(&self, bucket: &str) {
        self.buckets.lock().unwrap().insert(bucket.to_string());
    }

    /// Store an object modified at `modified`
    pub fn put(&self, bucket: &str, key: &str, content: &[u8], modified: DateTime<Utc>) {
        let metadata = SyncMetadata::new(content.len() as u64, Some(modified));
        self.put_with_metadata(bucket, key, content, metadata);
    }

    /// Store an object with explicit metadata
    pub fn put_with_metadata(
        &self,
        bucket: &str,
        key: &str,
        content: &[u8],
        metadata: SyncMetadata,
    ) {
        self.create_bucket(bucket);
        self.objects.lock().unwrap().insert(
            full_path(bucket, key),
            StoredObject {
                metadata,
                content: content.to_vec(),
            },
        );
    }

    /// Metadata of a stored object
    pub fn metadata(&self, bucket: &str, key: &str) -> Option<SyncMetadata> {
        self.objects
            .lock()
            .unwrap()
            .get(&full_path(bucket, key))
            .map(|o| o.metadata.clone())
    }

    /// Content of a stored object
    pub fn content(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&full_path(bucket, key))
            .map(|o| o.content.clone())
    }

    /// Fail metadata reads of one object
    pub fn fail_metadata(&self, bucket: &str, key: &str, fault: Fault) {
        self.metadata_faults
            .lock()
            .unwrap()
            .insert(full_path(bucket, key), fault);
    }

    /// Fail every copy request
    pub fn fail_copies(&self, fault: Fault) {
        *self.copy_fault.lock().unwrap() = Some(fault);
    }

    /// Time stamped on copied objects
    pub fn set_clock(&self, now: DateTime<Utc>) {
        *self.clock.lock().unwrap() = now;
    }

    /// Copy requests received so far
    pub fn copy_requests(&self) -> Vec<CopyObjectRequest> {
        self.copy_requests.lock().unwrap().clone()
    }

    /// Number of metadata reads served or failed
    pub fn metadata_reads(&self) -> usize {
        self.metadata_reads.load(Ordering::SeqCst)
    }

    /// Source object in `bucket` read through this store
    pub fn object(self: &Arc<Self>, bucket: &str, key: &str, relative_path: &str) -> SyncObject {
        let reader: Arc<dyn ObjectReader> = Arc::clone(self) as Arc<dyn ObjectReader>;
        SyncObject::in_bucket(reader, bucket, key, relative_path)
    }

    fn bucket_key(location: &ObjectLocation) -> Result<String, StorageError> {
        match location {
            ObjectLocation::Bucket { bucket, key, .. } => Ok(full_path(bucket, key)),
            other => Err(StorageError::UnsupportedLocation {
                location: other.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ObjectReader for MemoryStore {
    async fn read_metadata(&self, location: &ObjectLocation) -> Result<SyncMetadata, StorageError> {
        self.metadata_reads.fetch_add(1, Ordering::SeqCst);
        let path = Self::bucket_key(location)?;
        if let Some(fault) = self.metadata_faults.lock().unwrap().get(&path) {
            return Err(fault.into_error(&path));
        }
        self.objects
            .lock()
            .unwrap()
            .get(&path)
            .map(|o| o.metadata.clone())
            .ok_or_else(|| StorageError::not_found(&path))
    }

    async fn open(&self, location: &ObjectLocation) -> Result<ContentStream, StorageError> {
        let path = Self::bucket_key(location)?;
        let content = self
            .objects
            .lock()
            .unwrap()
            .get(&path)
            .map(|o| o.content.clone())
            .ok_or_else(|| StorageError::not_found(&path))?;
        Ok(Box::new(std::io::Cursor::new(content)))
    }
}

#[async_trait]
impl ObjectBackend for MemoryStore {
    async fn copy_object(
        &self,
        request: &CopyObjectRequest,
    ) -> Result<CopyObjectResult, StorageError> {
        self.copy_requests.lock().unwrap().push(request.clone());
        let target = full_path(&request.target_bucket, &request.target_key);
        if let Some(fault) = *self.copy_fault.lock().unwrap() {
            return Err(fault.into_error(&target));
        }
        if !self.buckets.lock().unwrap().contains(&request.target_bucket) {
            return Err(StorageError::not_found(&request.target_bucket));
        }

        let source = full_path(&request.source_bucket, &request.source_key);
        let mut objects = self.objects.lock().unwrap();
        let mut copied = objects
            .get(&source)
            .cloned()
            .ok_or_else(|| StorageError::not_found(&source))?;
        copied.metadata.modification_time = Some(*self.clock.lock().unwrap());
        let etag = etag_of(&copied.content);
        objects.insert(target, copied);

        Ok(CopyObjectResult { etag: Some(etag) })
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
        Ok(self.buckets.lock().unwrap().contains(bucket))
    }
}

/// Deterministic integrity tag of some content
pub fn etag_of(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Fixed reference time for reproducible timestamps
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Create a directory tree with files of the given sizes
pub fn create_tree(root: &Path, files: &[(&str, usize)]) -> std::io::Result<()> {
    for (relative, size) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, "A".repeat(*size))?;
    }
    Ok(())
}
