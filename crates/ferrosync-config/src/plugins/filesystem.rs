//! Local filesystem storage plugin

use crate::definition::{ConfigType, OptionSpec, PluginDefinition};
use crate::error::{ConfigError, ConfigResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// URI prefix of the filesystem plugin
pub const URI_PREFIX: &str = "file:";

static URI_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^file://(.+)$").expect("valid regex"));

/// Configuration of a local file or directory tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilesystemConfig {
    /// Primary file or directory
    pub path: Option<String>,
    /// Store objects under their absolute path instead of the relative one
    pub use_absolute_path: bool,
    /// Follow symbolic links while walking
    pub follow_links: bool,
    /// Read preserved metadata from sidecar files
    pub store_metadata: bool,
    /// Minimum age in seconds before a source file may be deleted
    pub delete_older_than: i64,
    /// Script run before deleting a source file
    pub delete_check_script: Option<String>,
    /// Only include files modified at or after this ISO-8601 instant
    pub modified_since: Option<String>,
    /// Regular expressions of paths to exclude
    pub excluded_paths: Vec<String>,
}

impl FilesystemConfig {
    /// Configuration for a path
    pub fn for_path<S: Into<String>>(path: S) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Canonical URI, `file://` followed by the path
    pub fn to_uri(&self) -> String {
        format!("{}//{}", URI_PREFIX, self.path.as_deref().unwrap_or_default())
    }

    /// Populate from a `file://<path>` URI
    pub fn apply_uri(&mut self, uri: &str) -> Result<(), String> {
        let captures = URI_PATTERN
            .captures(uri)
            .ok_or_else(|| "expected file://<path>".to_string())?;
        self.path = Some(captures[1].to_string());
        Ok(())
    }

    /// Parsed `modified_since` instant
    ///
    /// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` taken as UTC, or a
    /// bare date meaning midnight UTC.
    pub fn modified_since_time(&self) -> ConfigResult<Option<DateTime<Utc>>> {
        let Some(raw) = self.modified_since.as_deref() else {
            return Ok(None);
        };
        parse_instant(raw)
            .map(Some)
            .ok_or_else(|| {
                ConfigError::invalid_value(
                    "modified-since",
                    format!("'{}' is not an ISO-8601 instant", raw),
                )
            })
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl ConfigType for FilesystemConfig {
    const TYPE_NAME: &'static str = "FilesystemConfig";

    fn definition() -> PluginDefinition {
        PluginDefinition::storage::<Self>(URI_PREFIX)
            .label("Filesystem Plugin")
            .documentation(
                "The filesystem plugin reads and writes data from and to a local file or \
                 directory tree. URIs look like file://<path>, for example \
                 file:///home/user/myfiles. When the path is a directory, every file and \
                 subdirectory below it is included.",
            )
            .uri(Self::to_uri, Self::apply_uri)
            .option(
                OptionSpec::new("path", "The primary file or directory.")
                    .order(-1)
                    .bind(|c: &Self| &c.path, |c: &mut Self| &mut c.path),
            )
            .option(
                OptionSpec::new(
                    "useAbsolutePath",
                    "Store objects under the absolute path of the file instead of the path \
                     relative to the source directory.",
                )
                .bind(|c: &Self| &c.use_absolute_path, |c: &mut Self| &mut c.use_absolute_path),
            )
            .option(
                OptionSpec::new(
                    "followLinks",
                    "Follow symbolic links when walking the source tree. By default links are \
                     not followed.",
                )
                .bind(|c: &Self| &c.follow_links, |c: &mut Self| &mut c.follow_links),
            )
            .option(
                OptionSpec::new(
                    "storeMetadata",
                    "Read object metadata preserved in sidecar JSON files next to the data.",
                )
                .bind(|c: &Self| &c.store_metadata, |c: &mut Self| &mut c.store_metadata),
            )
            .option(
                OptionSpec::new(
                    "deleteOlderThan",
                    "When deleting the source, only delete files modified at least this many \
                     seconds ago.",
                )
                .value_hint("delete-age")
                .bind(|c: &Self| &c.delete_older_than, |c: &mut Self| &mut c.delete_older_than),
            )
            .option(
                OptionSpec::new(
                    "deleteCheckScript",
                    "When deleting the source, run this script first and only delete when it \
                     exits with 0.",
                )
                .value_hint("path-to-check-script")
                .bind(|c: &Self| &c.delete_check_script, |c: &mut Self| &mut c.delete_check_script),
            )
            .option(
                OptionSpec::new(
                    "modifiedSince",
                    "Only include files modified at or after this ISO-8601 instant, e.g. \
                     2024-01-01T00:00:00Z.",
                )
                .value_hint("yyyy-MM-ddThh:mm:ssZ")
                .bind(|c: &Self| &c.modified_since, |c: &mut Self| &mut c.modified_since),
            )
            .option(
                OptionSpec::new(
                    "excludedPaths",
                    "Regular expressions of paths to exclude. A matching directory excludes its \
                     whole subtree.",
                )
                .value_hint("regex-pattern")
                .bind(|c: &Self| &c.excluded_paths, |c: &mut Self| &mut c.excluded_paths),
            )
            .build()
    }
}
