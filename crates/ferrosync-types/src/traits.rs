//! Core traits for FerroSync operations
//!
//! Hooks through which the copy engine hands per-object results to whoever
//! drives the run (CLI, embedding service, tests).

use crate::{ObjectOutcome, SyncStats};

/// Trait for reporting per-object outcomes during a sync run
pub trait OutcomeReporter: Send + Sync {
    /// Report the outcome of a single object
    fn report_outcome(&self, outcome: &ObjectOutcome);

    /// Report completion of the run
    fn report_completion(&self, stats: &SyncStats);
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl OutcomeReporter for NullReporter {
    fn report_outcome(&self, _outcome: &ObjectOutcome) {}

    fn report_completion(&self, _stats: &SyncStats) {}
}
