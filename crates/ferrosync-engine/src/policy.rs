//! Overwrite policy for existing target objects
//!
//! Decides whether a source object replaces what is already stored at its
//! target address. Timestamps are compared exactly.

use ferrosync_model::SyncMetadata;
use std::fmt;
use tracing::trace;

/// Why an object is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteReason {
    /// Overwrite was forced
    Forced,
    /// Nothing exists at the target address
    Absent,
    /// Target is older or differs from the source
    Stale,
    /// Source has no modification time to compare
    UnknownSourceTime,
}

/// Why an object is skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Target has the same modification time and size
    InSync,
    /// Target was modified after the source
    TargetNewer,
}

/// Outcome of the overwrite policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Write the object
    Write(WriteReason),
    /// Leave the target untouched
    Skip(SkipReason),
}

impl Decision {
    /// Whether the object is written
    pub fn is_write(self) -> bool {
        matches!(self, Self::Write(_))
    }
}

impl fmt::Display for WriteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forced => "overwrite forced",
            Self::Absent => "target absent",
            Self::Stale => "target stale",
            Self::UnknownSourceTime => "source modification time unknown",
        })
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InSync => "source and target the same",
            Self::TargetNewer => "target newer than source",
        })
    }
}

/// Skip-or-write rule applied to every object that has a target address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverwritePolicy {
    /// Write regardless of what the target holds
    pub force: bool,
}

impl OverwritePolicy {
    /// Policy with the given force flag
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    /// Decide for a source object given the target's current metadata
    pub fn decide(&self, source: &SyncMetadata, existing: Option<&SyncMetadata>) -> Decision {
        if self.force {
            return Decision::Write(WriteReason::Forced);
        }
        let Some(existing) = existing else {
            return Decision::Write(WriteReason::Absent);
        };
        let Some(source_time) = source.modification_time else {
            return Decision::Write(WriteReason::UnknownSourceTime);
        };

        trace!(
            "Comparing source ({}, {} bytes) with target ({:?}, {} bytes)",
            source_time,
            source.content_length,
            existing.modification_time,
            existing.content_length
        );

        match existing.modification_time {
            Some(target_time)
                if target_time == source_time && existing.content_length == source.content_length =>
            {
                Decision::Skip(SkipReason::InSync)
            }
            Some(target_time) if target_time > source_time => {
                Decision::Skip(SkipReason::TargetNewer)
            }
            _ => Decision::Write(WriteReason::Stale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rstest::rstest;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn meta(offset_secs: i64, size: u64) -> SyncMetadata {
        SyncMetadata::new(size, Some(base_time() + Duration::seconds(offset_secs)))
    }

    #[rstest]
    #[case::same(meta(0, 100), Decision::Skip(SkipReason::InSync))]
    #[case::target_newer(meta(1, 100), Decision::Skip(SkipReason::TargetNewer))]
    #[case::target_newer_other_size(meta(1, 5), Decision::Skip(SkipReason::TargetNewer))]
    #[case::target_older(meta(-1, 50), Decision::Write(WriteReason::Stale))]
    #[case::same_time_other_size(meta(0, 101), Decision::Write(WriteReason::Stale))]
    fn test_decide_existing(#[case] existing: SyncMetadata, #[case] expected: Decision) {
        let policy = OverwritePolicy::default();
        assert_eq!(policy.decide(&meta(0, 100), Some(&existing)), expected);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(meta(0, 100)))]
    #[case(Some(meta(3600, 100)))]
    fn test_force_always_writes(#[case] existing: Option<SyncMetadata>) {
        let policy = OverwritePolicy::new(true);
        assert_eq!(
            policy.decide(&meta(0, 100), existing.as_ref()),
            Decision::Write(WriteReason::Forced)
        );
    }

    #[test]
    fn test_absent_target_writes() {
        let decision = OverwritePolicy::default().decide(&meta(0, 100), None);
        assert_eq!(decision, Decision::Write(WriteReason::Absent));
        assert!(decision.is_write());
    }

    #[test]
    fn test_unknown_times() {
        let policy = OverwritePolicy::default();
        let unknown = SyncMetadata::new(100, None);
        assert_eq!(
            policy.decide(&unknown, Some(&meta(0, 100))),
            Decision::Write(WriteReason::UnknownSourceTime)
        );
        assert_eq!(
            policy.decide(&meta(0, 100), Some(&unknown)),
            Decision::Write(WriteReason::Stale)
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(SkipReason::TargetNewer.to_string(), "target newer than source");
        assert_eq!(WriteReason::Absent.to_string(), "target absent");
    }
}
