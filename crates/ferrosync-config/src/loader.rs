//! Settings loading helpers

use crate::settings::SyncSettings;
use crate::{ConfigError, ConfigResult, SettingsBuilder};
use std::path::{Path, PathBuf};

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "FERROSYNC";

/// Common settings loading patterns
#[derive(Debug, Clone, Copy)]
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from the first settings file found in the default
    /// locations, then apply environment overrides
    pub fn load_default() -> ConfigResult<SyncSettings> {
        let mut builder = SettingsBuilder::new();
        if let Some(path) = Self::settings_exists() {
            builder = builder.add_source_file(path);
        }
        builder.add_env_prefix(ENV_PREFIX).build()
    }

    /// Load settings from a specific file, which must exist
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<SyncSettings> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Settings file not found",
                ),
            });
        }

        SettingsBuilder::new()
            .add_source_file(path)
            .add_env_prefix(ENV_PREFIX)
            .build()
    }

    /// Save settings, choosing the format from the file extension
    pub fn save_to_file<P: AsRef<Path>>(settings: &SyncSettings, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                toml::to_string_pretty(settings).map_err(|e| ConfigError::Serialization {
                    message: format!("Failed to serialize to TOML: {}", e),
                })?
            }
            Some("json") => {
                serde_json::to_string_pretty(settings).map_err(|e| ConfigError::Serialization {
                    message: format!("Failed to serialize to JSON: {}", e),
                })?
            }
            _ => serde_yaml::to_string(settings)?,
        };

        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Render settings as YAML
    pub fn to_yaml(settings: &SyncSettings) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(settings)?)
    }

    /// Default settings file locations in order of preference
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("ferrosync.yaml"),
            PathBuf::from("ferrosync.yml"),
            PathBuf::from("ferrosync.toml"),
            PathBuf::from(".ferrosync.yaml"),
            PathBuf::from(".ferrosync.toml"),
        ];

        if let Some(config_dir) = user_config_dir() {
            let dir = config_dir.join("ferrosync");
            paths.push(dir.join("settings.yaml"));
            paths.push(dir.join("settings.toml"));
        }

        #[cfg(unix)]
        {
            paths.push(PathBuf::from("/etc/ferrosync/settings.yaml"));
            paths.push(PathBuf::from("/etc/ferrosync/settings.toml"));
        }

        paths
    }

    /// First settings file that exists in the default locations
    pub fn settings_exists() -> Option<PathBuf> {
        Self::default_paths().into_iter().find(|path| path.exists())
    }
}

fn user_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("settings.yaml")]
    #[case("settings.toml")]
    #[case("settings.json")]
    fn test_save_and_load(#[case] name: &str) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(name);

        let mut settings = SyncSettings::default();
        settings.copy.force = true;
        settings.logging.level = "warn".to_string();
        SettingsLoader::save_to_file(&settings, &path).unwrap();

        let loaded = SettingsLoader::load_from_file(&path).unwrap();
        assert!(loaded.copy.force);
        assert_eq!(loaded.logging.level, "warn");
        assert_eq!(loaded.performance, settings.performance);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = SettingsLoader::load_from_file(temp_dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_yaml_rendering() {
        let yaml = SettingsLoader::to_yaml(&SyncSettings::default()).unwrap();
        assert!(yaml.contains("workers"));
        assert!(yaml.contains("level: info"));
    }
}
