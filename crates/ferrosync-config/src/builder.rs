//! Settings builder layering defaults, files and environment variables

use crate::settings::{SyncSettings, LOG_LEVELS};
use crate::{ConfigError, ConfigResult};
use config::{ConfigBuilder as ConfigBuilderInner, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Separator between the prefix and nested keys of environment overrides
const ENV_SEPARATOR: &str = "__";

/// Builder for [`SyncSettings`] from multiple sources
#[derive(Debug)]
pub struct SettingsBuilder {
    inner: ConfigBuilderInner<config::builder::DefaultState>,
    sources: Vec<SettingsSource>,
}

#[derive(Debug, Clone)]
enum SettingsSource {
    File { path: PathBuf, format: FileFormat },
    Environment { prefix: String },
}

impl SettingsBuilder {
    /// Create a new settings builder
    pub fn new() -> Self {
        Self {
            inner: config::Config::builder(),
            sources: Vec::new(),
        }
    }

    /// Add a settings file; missing files are ignored
    pub fn add_source_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let format = Self::detect_format(&path);
        self.sources.push(SettingsSource::File { path, format });
        self
    }

    /// Add environment variables with prefix, e.g. `FERROSYNC__COPY__FORCE`
    pub fn add_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.sources.push(SettingsSource::Environment {
            prefix: prefix.into(),
        });
        self
    }

    /// Build and validate the settings
    pub fn build(mut self) -> ConfigResult<SyncSettings> {
        let defaults = serde_yaml::to_value(SyncSettings::default())
            .map_err(|e| ConfigError::other(format!("Failed to serialize defaults: {}", e)))?;
        self.inner = self
            .inner
            .add_source(config::Config::try_from(&defaults)?);

        for source in &self.sources {
            match source {
                SettingsSource::File { path, format } => {
                    if path.exists() {
                        debug!("Loading settings from {}", path.display());
                        self.inner = self
                            .inner
                            .add_source(File::from(path.clone()).format(*format));
                    }
                }
                SettingsSource::Environment { prefix } => {
                    self.inner = self.inner.add_source(
                        Environment::with_prefix(prefix)
                            .prefix_separator(ENV_SEPARATOR)
                            .separator(ENV_SEPARATOR),
                    );
                }
            }
        }

        let settings: SyncSettings = self.inner.build()?.try_deserialize()?;
        Self::validate(&settings)?;
        Ok(settings)
    }

    fn detect_format(path: &Path) -> FileFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }

    fn validate(settings: &SyncSettings) -> ConfigResult<()> {
        if !LOG_LEVELS.contains(&settings.logging.level.as_str()) {
            return Err(ConfigError::validation(format!(
                "Log level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn settings_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_builder_defaults() {
        let settings = SettingsBuilder::new().build().unwrap();
        assert_eq!(settings, SyncSettings::default());
        assert!(!settings.copy.force);
    }

    #[test]
    fn test_builder_yaml_file() {
        let file = settings_file(
            ".yaml",
            r#"
performance:
  workers: 8
  buffer_size: 1048576
copy:
  force: true
"#,
        );

        let settings = SettingsBuilder::new()
            .add_source_file(file.path())
            .build()
            .unwrap();
        assert_eq!(settings.performance.workers.get(), 8);
        assert_eq!(settings.performance.buffer_size.get(), 1024 * 1024);
        assert!(settings.copy.force);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_builder_toml_file() {
        let file = settings_file(
            ".toml",
            r#"
[logging]
level = "debug"
json_format = true
"#,
        );

        let settings = SettingsBuilder::new()
            .add_source_file(file.path())
            .build()
            .unwrap();
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.logging.json_format);
    }

    #[test]
    fn test_builder_rejects_zero_workers() {
        let file = settings_file(".yaml", "performance:\n  workers: 0\n");
        let err = SettingsBuilder::new()
            .add_source_file(file.path())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("below minimum"));
    }

    #[test]
    fn test_builder_rejects_unknown_log_level() {
        let file = settings_file(".yaml", "logging:\n  level: chatty\n");
        let result = SettingsBuilder::new().add_source_file(file.path()).build();
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let settings = SettingsBuilder::new()
            .add_source_file("/nonexistent/ferrosync.yaml")
            .build()
            .unwrap();
        assert_eq!(settings, SyncSettings::default());
    }
}
