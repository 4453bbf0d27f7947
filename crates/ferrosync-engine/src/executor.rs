//! Worker pool running a target over a stream of objects

use crate::error::CopyError;
use crate::target::{CopyOutcome, SyncTarget};
use ferrosync_config::SyncSettings;
use ferrosync_model::{SourceError, SyncObject};
use ferrosync_types::{NullReporter, ObjectOutcome, OutcomeReporter, SyncStats, ThreadCount};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Configuration for the sync executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Maximum number of objects processed concurrently
    pub workers: usize,
}

impl ExecutorConfig {
    /// Create executor config from run settings
    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self {
            workers: settings.performance.workers.get(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            workers: ThreadCount::default().get(),
        }
    }
}

/// Runs a [`SyncTarget`] over source objects on a bounded worker pool
///
/// Each object is owned by exactly one task. Failures are recorded per object
/// and never abort the run. Cancelling the executor's token aborts objects
/// in flight as [`CopyError::Cancelled`] and stops dispatching new ones.
pub struct SyncExecutor {
    config: ExecutorConfig,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
    reporter: Arc<dyn OutcomeReporter>,
}

impl SyncExecutor {
    /// Create a new executor
    pub fn new(config: ExecutorConfig) -> Self {
        let workers = config.workers.max(1);
        Self {
            config,
            semaphore: Arc::new(Semaphore::new(workers)),
            cancel: CancellationToken::new(),
            reporter: Arc::new(NullReporter),
        }
    }

    /// Report outcomes to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn OutcomeReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Token that cancels this executor's runs
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the current run
    pub fn cancel(&self) {
        info!("Cancelling sync run");
        self.cancel.cancel();
    }

    /// Copy every object to `target` and return the run totals
    ///
    /// `objects` is pulled on the calling task, so each `next()` blocks it.
    /// The executor yields after every dispatch so in-flight copies keep
    /// running between pulls, even on a current-thread runtime.
    pub async fn run<T, I>(&self, target: Arc<T>, objects: I) -> SyncStats
    where
        T: SyncTarget + ?Sized + 'static,
        I: IntoIterator<Item = Result<SyncObject, SourceError>>,
    {
        let start_time = Instant::now();
        let mut stats = SyncStats::new();
        let mut tasks = JoinSet::new();

        info!(
            "Starting sync to {} with {} workers",
            target.name(),
            self.config.workers
        );

        for item in objects {
            while let Some(joined) = tasks.try_join_next() {
                self.record(&mut stats, joined_outcome(joined));
            }

            let object = match item {
                Ok(object) => object,
                Err(e) => {
                    warn!("Source error: {}", e);
                    let outcome = ObjectOutcome::failed(source_subject(&e), e.to_string());
                    self.record(&mut stats, outcome);
                    continue;
                }
            };

            let permit = tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    debug!("Run cancelled before dispatching {}", object.relative_path());
                    break;
                }
                permit = Arc::clone(&self.semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(e) => {
                        error!("Worker pool closed: {}", e);
                        break;
                    }
                },
            };

            let target = Arc::clone(&target);
            let cancel = self.cancel.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let mut object = object;
                let relative_path = object.relative_path().to_string();
                let result = tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(CopyError::Cancelled),
                    result = target.copy(&mut object) => result,
                };
                outcome_of(&relative_path, result)
            });
            tokio::task::yield_now().await;
        }

        while let Some(joined) = tasks.join_next().await {
            self.record(&mut stats, joined_outcome(joined));
        }

        stats.duration = start_time.elapsed();
        info!(
            "Sync finished: {} written, {} skipped, {} failed, {} cancelled in {:?}",
            stats.objects_written,
            stats.objects_skipped,
            stats.objects_failed,
            stats.objects_cancelled,
            stats.duration
        );
        self.reporter.report_completion(&stats);
        stats
    }

    fn record(&self, stats: &mut SyncStats, outcome: ObjectOutcome) {
        self.reporter.report_outcome(&outcome);
        stats.record(&outcome);
    }
}

fn outcome_of(relative_path: &str, result: Result<CopyOutcome, CopyError>) -> ObjectOutcome {
    match result {
        Ok(outcome) => outcome.to_object_outcome(relative_path),
        Err(CopyError::Cancelled) => {
            debug!("Cancelled {}", relative_path);
            ObjectOutcome::cancelled(relative_path)
        }
        Err(e) => {
            warn!("{}", e);
            ObjectOutcome::failed(relative_path, e.to_string())
        }
    }
}

fn joined_outcome(joined: Result<ObjectOutcome, JoinError>) -> ObjectOutcome {
    joined.unwrap_or_else(|e| {
        error!("Copy task did not complete: {}", e);
        ObjectOutcome::failed("<unknown>", e.to_string())
    })
}

fn source_subject(error: &SourceError) -> &str {
    match error {
        SourceError::MetadataUnavailable { identifier, .. }
        | SourceError::ContentUnavailable { identifier, .. } => identifier,
        SourceError::Listing { root, .. } => root,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ferrosync_model::{ContentStream, ObjectLocation, ObjectReader, StorageError, SyncMetadata};
    use ferrosync_types::OutcomeKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug)]
    struct NullReader;

    #[async_trait]
    impl ObjectReader for NullReader {
        async fn read_metadata(
            &self,
            location: &ObjectLocation,
        ) -> Result<SyncMetadata, StorageError> {
            Err(StorageError::not_found(location))
        }

        async fn open(&self, location: &ObjectLocation) -> Result<ContentStream, StorageError> {
            Err(StorageError::not_found(location))
        }
    }

    /// Target whose behaviour is chosen by the first path segment
    #[derive(Default)]
    struct ScriptedTarget {
        started: AtomicUsize,
        running: AtomicUsize,
        max_running: AtomicUsize,
    }

    #[async_trait]
    impl SyncTarget for ScriptedTarget {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn copy(&self, object: &mut SyncObject) -> Result<CopyOutcome, CopyError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(running, Ordering::SeqCst);

            let path = object.relative_path().to_string();
            let result = match path.split('/').next() {
                Some("skip") => Ok(CopyOutcome::Skipped(crate::SkipReason::InSync)),
                Some("fail") => Err(CopyError::write_failed(&path, StorageError::not_found(&path))),
                Some("hang") => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(CopyOutcome::SkippedDirectory)
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(CopyOutcome::Written {
                        target_key: path.clone(),
                        etag: None,
                        bytes: 10,
                        reason: crate::WriteReason::Absent,
                    })
                }
            };

            self.running.fetch_sub(1, Ordering::SeqCst);
            result
        }

        fn reverse(&self, object: &SyncObject) -> SyncObject {
            SyncObject::in_bucket(
                Arc::clone(object.reader()),
                "target",
                object.key(),
                object.relative_path(),
            )
        }
    }

    #[derive(Default)]
    struct CollectingReporter {
        outcomes: Mutex<Vec<ObjectOutcome>>,
        completed: Mutex<Option<SyncStats>>,
    }

    impl OutcomeReporter for CollectingReporter {
        fn report_outcome(&self, outcome: &ObjectOutcome) {
            self.outcomes.lock().unwrap().push(outcome.clone());
        }

        fn report_completion(&self, stats: &SyncStats) {
            *self.completed.lock().unwrap() = Some(stats.clone());
        }
    }

    fn objects(paths: &[&str]) -> Vec<Result<SyncObject, SourceError>> {
        let reader: Arc<dyn ObjectReader> = Arc::new(NullReader);
        paths
            .iter()
            .map(|path| Ok(SyncObject::in_bucket(Arc::clone(&reader), "source", *path, *path)))
            .collect()
    }

    #[tokio::test]
    async fn test_run_counts_outcomes() {
        let reporter = Arc::new(CollectingReporter::default());
        let executor =
            SyncExecutor::new(ExecutorConfig { workers: 4 }).with_reporter(reporter.clone());
        let mut items = objects(&["a.txt", "skip/b.txt", "fail/c.txt", "d.txt"]);
        items.push(Err(SourceError::Listing {
            root: "source/".into(),
            message: "listing truncated".into(),
        }));

        let stats = executor.run(Arc::new(ScriptedTarget::default()), items).await;

        assert_eq!(stats.objects_written, 2);
        assert_eq!(stats.bytes_written, 20);
        assert_eq!(stats.objects_skipped, 1);
        assert_eq!(stats.objects_failed, 2);
        assert!(!stats.is_clean());

        let outcomes = reporter.outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 5);
        assert!(outcomes
            .iter()
            .any(|o| o.kind == OutcomeKind::Failed && o.relative_path == "fail/c.txt"));
        assert_eq!(reporter.completed.lock().unwrap().as_ref(), Some(&stats));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_workers_bound_concurrency() {
        let target = Arc::new(ScriptedTarget::default());
        let executor = SyncExecutor::new(ExecutorConfig { workers: 2 });
        let paths: Vec<String> = (0..8).map(|i| format!("file-{}.bin", i)).collect();
        let paths: Vec<&str> = paths.iter().map(String::as_str).collect();

        let stats = executor.run(Arc::clone(&target), objects(&paths)).await;

        assert_eq!(stats.objects_written, 8);
        assert!(target.max_running.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_copies_progress_while_listing() {
        let target = Arc::new(ScriptedTarget::default());
        let started_at_pull = Arc::new(Mutex::new(Vec::new()));
        let listing = {
            let target = Arc::clone(&target);
            let started_at_pull = Arc::clone(&started_at_pull);
            objects(&["a.txt", "b.txt", "c.txt", "d.txt"])
                .into_iter()
                .map(move |item| {
                    let started = target.started.load(Ordering::SeqCst);
                    started_at_pull.lock().unwrap().push(started);
                    item
                })
        };
        let executor = SyncExecutor::new(ExecutorConfig { workers: 4 });

        let stats = executor.run(Arc::clone(&target), listing).await;

        assert_eq!(stats.objects_written, 4);
        assert_eq!(*started_at_pull.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_objects() {
        let executor = SyncExecutor::new(ExecutorConfig { workers: 2 });
        let token = executor.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let stats = executor
            .run(
                Arc::new(ScriptedTarget::default()),
                objects(&["hang/1", "hang/2", "hang/3", "hang/4"]),
            )
            .await;

        assert_eq!(stats.objects_cancelled, 2);
        assert_eq!(stats.objects_processed(), 2);
        assert_eq!(stats.objects_written, 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_dispatches_nothing() {
        let executor = SyncExecutor::new(ExecutorConfig::default());
        executor.cancel();
        let stats = executor
            .run(Arc::new(ScriptedTarget::default()), objects(&["a.txt", "b.txt"]))
            .await;
        assert_eq!(stats.objects_processed(), 0);
    }

    #[test]
    fn test_config_from_settings() {
        let mut settings = SyncSettings::default();
        settings.performance.workers = ThreadCount::new(3).unwrap();
        assert_eq!(ExecutorConfig::from_settings(&settings).workers, 3);
    }
}
