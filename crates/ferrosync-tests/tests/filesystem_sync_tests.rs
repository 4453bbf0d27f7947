//! End-to-end tests from a filesystem source through the executor

use async_trait::async_trait;
use ferrosync_config::{EcsNamespaceCopyConfig, FilesystemConfig, SyncSettings};
use ferrosync_engine::{
    CopyError, CopyOutcome, ExecutorConfig, NamespaceCopyTarget, SyncExecutor, SyncTarget,
    WriteReason,
};
use ferrosync_model::{FilesystemSource, ObjectReader, StorageError, SyncObject};
use ferrosync_tests::test_utils::{create_tree, MemoryStore};
use ferrosync_types::{BufferSize, ObjectOutcome, OutcomeKind, OutcomeReporter, SyncStats};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

/// Uploads file content into a bucket of the in-memory store
struct UploadTarget {
    store: Arc<MemoryStore>,
    bucket: String,
}

#[async_trait]
impl SyncTarget for UploadTarget {
    fn name(&self) -> &str {
        "upload"
    }

    async fn copy(&self, object: &mut SyncObject) -> Result<CopyOutcome, CopyError> {
        let relative_path = object.relative_path().to_string();
        let Some(mut stream) = object
            .content_stream()
            .await
            .map_err(|e| CopyError::write_failed(&relative_path, e))?
        else {
            return Ok(CopyOutcome::SkippedDirectory);
        };

        let mut content = Vec::new();
        stream
            .read_to_end(&mut content)
            .await
            .map_err(|e| CopyError::write_failed(&relative_path, e))?;
        let modified = object
            .metadata()
            .await
            .map_err(|e| CopyError::write_failed(&relative_path, e))?
            .modification_time
            .unwrap_or_default();

        self.store.put(&self.bucket, &relative_path, &content, modified);
        Ok(CopyOutcome::Written {
            target_key: relative_path,
            etag: None,
            bytes: content.len() as u64,
            reason: WriteReason::Absent,
        })
    }

    fn reverse(&self, object: &SyncObject) -> SyncObject {
        self.store.object(&self.bucket, object.relative_path(), object.relative_path())
    }
}

#[derive(Default)]
struct Recorder {
    outcomes: Mutex<Vec<ObjectOutcome>>,
}

impl OutcomeReporter for Recorder {
    fn report_outcome(&self, outcome: &ObjectOutcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }

    fn report_completion(&self, _stats: &SyncStats) {}
}

fn source_tree() -> (TempDir, FilesystemSource) {
    let temp_dir = TempDir::new().unwrap();
    create_tree(
        temp_dir.path(),
        &[
            ("small.txt", 1024),
            ("subdir1/file1.txt", 2048),
            ("subdir1/nested/file3.txt", 8192),
            ("subdir2/file2.txt", 4096),
            ("subdir2/skip.tmp", 10),
        ],
    )
    .unwrap();

    let mut config = FilesystemConfig::for_path(temp_dir.path().to_string_lossy());
    config.excluded_paths = vec![r"\.tmp$".to_string()];
    let source = FilesystemSource::new(&config, BufferSize::default()).unwrap();
    (temp_dir, source)
}

#[tokio::test]
async fn test_filesystem_to_bucket_upload() {
    let (_temp_dir, source) = source_tree();
    let store = MemoryStore::with_buckets(&["uploads"]);
    let target = Arc::new(UploadTarget {
        store: Arc::clone(&store),
        bucket: "uploads".into(),
    });
    let recorder = Arc::new(Recorder::default());
    let executor = SyncExecutor::new(ExecutorConfig::from_settings(&SyncSettings::default()))
        .with_reporter(recorder.clone());

    let stats = executor.run(Arc::clone(&target), source.objects()).await;

    assert_eq!(stats.objects_written, 4);
    assert_eq!(stats.bytes_written, 1024 + 2048 + 8192 + 4096);
    // subdir1, subdir1/nested, subdir2
    assert_eq!(stats.objects_skipped, 3);
    assert!(stats.is_clean());

    assert_eq!(
        store.content("uploads", "subdir1/nested/file3.txt").map(|c| c.len()),
        Some(8192)
    );
    assert!(store.content("uploads", "subdir2/skip.tmp").is_none());
    let uploaded = store.metadata("uploads", "small.txt").unwrap();
    assert!(uploaded.modification_time.is_some());

    let outcomes = recorder.outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 7);
    assert!(outcomes.iter().all(|o| o.kind != OutcomeKind::Failed));
}

#[tokio::test]
async fn test_namespace_copy_rejects_filesystem_objects() {
    let (_temp_dir, source) = source_tree();
    let store = MemoryStore::with_buckets(&["archive"]);
    let mut config = EcsNamespaceCopyConfig::default();
    config.apply_uri("ecs-ns-copy:ak:sk@ecs.local").unwrap();
    config.target_bucket = Some("archive".into());
    let target = NamespaceCopyTarget::configure(&config, Arc::clone(&store))
        .await
        .unwrap();

    let mut object = source
        .objects()
        .map(Result::unwrap)
        .find(|o| o.relative_path() == "small.txt")
        .unwrap();
    match target.copy(&mut object).await {
        Err(CopyError::WriteFailed { source, .. }) => {
            let storage = source.downcast_ref::<StorageError>().unwrap();
            assert!(matches!(storage, StorageError::UnsupportedLocation { .. }));
        }
        other => panic!("expected WriteFailed, got {:?}", other),
    }
    assert!(store.copy_requests().is_empty());

    let executor = SyncExecutor::new(ExecutorConfig { workers: 2 });
    let stats = executor.run(Arc::new(target), source.objects()).await;
    assert_eq!(stats.objects_failed, 4);
    assert_eq!(stats.objects_skipped, 3);
    assert_eq!(stats.objects_written, 0);
}

#[tokio::test]
async fn test_reverse_after_upload_reads_bucket() {
    let (_temp_dir, source) = source_tree();
    let store = MemoryStore::with_buckets(&["uploads"]);
    let target = UploadTarget {
        store: Arc::clone(&store),
        bucket: "uploads".into(),
    };

    let mut object = source
        .objects()
        .map(Result::unwrap)
        .find(|o| o.relative_path() == "subdir2/file2.txt")
        .unwrap();
    target.copy(&mut object).await.unwrap();

    let mut reversed = target.reverse(&object);
    assert_eq!(reversed.identifier(), "uploads/subdir2/file2.txt");
    assert_eq!(reversed.metadata().await.unwrap().content_length, 4096);
    let reader: &Arc<dyn ObjectReader> = reversed.reader();
    assert!(reader.read_metadata(reversed.location()).await.is_ok());
}
