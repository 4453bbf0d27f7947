//! Run accounting types for FerroSync
//!
//! The copy engine reports one [`ObjectOutcome`] per processed object; the
//! outer run controller folds them into [`SyncStats`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Final state of one object after the copy engine processed it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OutcomeKind {
    /// Object was written to the target
    Written,
    /// Object was deliberately not written
    Skipped,
    /// Object failed and is reported to the run
    Failed,
    /// Processing was aborted by a cancellation signal
    Cancelled,
}

/// Outcome of processing a single object
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectOutcome {
    /// Relative path of the object
    pub relative_path: String,
    /// What happened to the object
    pub kind: OutcomeKind,
    /// Bytes written (zero unless written)
    pub bytes: u64,
    /// Reason for a skip or the failure message
    pub detail: Option<String>,
}

impl ObjectOutcome {
    /// Outcome for a written object
    pub fn written(relative_path: impl Into<String>, bytes: u64) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: OutcomeKind::Written,
            bytes,
            detail: None,
        }
    }

    /// Outcome for a skipped object
    pub fn skipped(relative_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: OutcomeKind::Skipped,
            bytes: 0,
            detail: Some(reason.into()),
        }
    }

    /// Outcome for a failed object
    pub fn failed(relative_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: OutcomeKind::Failed,
            bytes: 0,
            detail: Some(message.into()),
        }
    }

    /// Outcome for an object aborted by cancellation
    pub fn cancelled(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: OutcomeKind::Cancelled,
            bytes: 0,
            detail: None,
        }
    }
}

/// Aggregated statistics for a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncStats {
    /// Number of objects written to the target
    pub objects_written: u64,
    /// Number of objects skipped by policy
    pub objects_skipped: u64,
    /// Number of objects that failed
    pub objects_failed: u64,
    /// Number of objects aborted by cancellation
    pub objects_cancelled: u64,
    /// Total bytes written
    pub bytes_written: u64,
    /// Total duration of the run
    pub duration: Duration,
}

impl SyncStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a single outcome into the totals
    pub fn record(&mut self, outcome: &ObjectOutcome) {
        match outcome.kind {
            OutcomeKind::Written => {
                self.objects_written += 1;
                self.bytes_written += outcome.bytes;
            }
            OutcomeKind::Skipped => self.objects_skipped += 1,
            OutcomeKind::Failed => self.objects_failed += 1,
            OutcomeKind::Cancelled => self.objects_cancelled += 1,
        }
    }

    /// Total objects seen by the engine
    pub fn objects_processed(&self) -> u64 {
        self.objects_written + self.objects_skipped + self.objects_failed + self.objects_cancelled
    }

    /// Whether every processed object either was written or skipped
    pub fn is_clean(&self) -> bool {
        self.objects_failed == 0 && self.objects_cancelled == 0
    }

    /// Merge statistics from another instance
    pub fn merge(&mut self, other: &SyncStats) {
        self.objects_written += other.objects_written;
        self.objects_skipped += other.objects_skipped;
        self.objects_failed += other.objects_failed;
        self.objects_cancelled += other.objects_cancelled;
        self.bytes_written += other.bytes_written;
        self.duration += other.duration;
    }
}
