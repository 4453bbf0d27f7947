//! Run-level settings
//!
//! Unlike plugin configurations, which describe a single source, target or
//! filter, these settings tune the run itself: worker pool, stream buffers,
//! default overwrite policy and logging.

use ferrosync_types::{BufferSize, ThreadCount};
use serde::{Deserialize, Serialize};

/// Settings for one sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Worker pool and buffering
    #[serde(default)]
    pub performance: PerformanceSettings,
    /// Copy behaviour
    #[serde(default)]
    pub copy: CopySettings,
    /// Logging output
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Worker pool and buffering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceSettings {
    /// Buffer size of object content streams
    pub buffer_size: BufferSize,
    /// Number of objects processed concurrently
    pub workers: ThreadCount,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            buffer_size: BufferSize::default(),
            workers: ThreadCount::default(),
        }
    }
}

/// Copy behaviour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopySettings {
    /// Overwrite targets unless a plugin configuration says otherwise
    pub force: bool,
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Log levels accepted in [`LoggingSettings::level`]
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
