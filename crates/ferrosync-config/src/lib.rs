//! Plugin configuration registry and run settings for FerroSync
//!
//! This crate knows every storage and filter plugin FerroSync ships, how to
//! address a storage plugin by URI, how to expose a plugin's options on the
//! command line, and how to load the run-level settings.
//!
//! # Features
//!
//! - **Registry**: lazily built, cached [`ConfigWrapper`]s per plugin type
//! - **Addressing**: URI prefix lookup, parsing and canonical generation
//! - **CLI synthesis**: clap arguments derived from plugin option metadata
//! - **Settings**: YAML, TOML or JSON files with environment overrides
//!
//! # Examples
//!
//! ```rust
//! use ferrosync_config::{ConfigRegistry, FilesystemConfig};
//!
//! let registry = ConfigRegistry::with_builtin_plugins();
//! let (wrapper, config) = registry
//!     .storage_config_from_uri("file:///var/data")
//!     .expect("filesystem plugin is built in");
//!
//! assert_eq!(wrapper.label(), "Filesystem Plugin");
//! let config = config.downcast_ref::<FilesystemConfig>().unwrap();
//! assert_eq!(config.path.as_deref(), Some("/var/data"));
//! assert_eq!(wrapper.generate_uri(config).unwrap(), "file:///var/data");
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod builder;
pub mod cli;
pub mod definition;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod locator;
pub mod plugins;
pub mod registry;
pub mod settings;
pub mod wrapper;

pub use builder::SettingsBuilder;
pub use definition::{
    ConfigType, DefinitionBuilder, OptionSpec, PluginConfig, PluginDefinition, PLUGIN_API_VERSION,
};
pub use descriptor::{
    hyphenate, join, Capability, ConfigDescriptor, OptionDescriptor, OptionField, OptionValue,
    PluginRole, ValueArity, ValueType,
};
pub use error::{ConfigError, ConfigResult, PluginLoadError};
pub use loader::SettingsLoader;
pub use locator::{PluginCandidate, PluginLocator, PluginManifest};
pub use plugins::{
    EcsNamespaceCopyConfig, FilesystemConfig, GladinetMappingConfig, RestoreAclConfig,
};
pub use registry::{ConfigRegistry, WrapperIter};
pub use settings::{CopySettings, LoggingSettings, PerformanceSettings, SyncSettings};
pub use wrapper::ConfigWrapper;
