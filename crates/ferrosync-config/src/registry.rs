//! Process-wide cache of configuration wrappers
//!
//! Wrappers are built lazily, at most once per type, and shared as
//! `Arc<ConfigWrapper>`. Building one type never blocks lookups of another:
//! the map lock is only held long enough to fetch the per-type cell.

use crate::definition::{ConfigType, PluginConfig};
use crate::descriptor::Capability;
use crate::error::{ConfigError, ConfigResult};
use crate::locator::{PluginCandidate, PluginLocator, PluginManifest};
use crate::wrapper::ConfigWrapper;
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

type WrapperCell = Arc<OnceCell<Arc<ConfigWrapper>>>;

static GLOBAL: Lazy<ConfigRegistry> = Lazy::new(ConfigRegistry::with_builtin_plugins);

/// Registry of plugin configuration wrappers
pub struct ConfigRegistry {
    locator: Box<dyn PluginLocator>,
    cache: Mutex<HashMap<String, WrapperCell>>,
}

impl fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("cached", &self.cached_types())
            .finish_non_exhaustive()
    }
}

impl ConfigRegistry {
    /// Registry over an arbitrary locator
    pub fn new<L: PluginLocator + 'static>(locator: L) -> Self {
        Self {
            locator: Box::new(locator),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Registry over the built-in manifest
    pub fn with_builtin_plugins() -> Self {
        Self::new(PluginManifest::builtin())
    }

    /// Shared registry over the built-in manifest
    pub fn global() -> &'static ConfigRegistry {
        &GLOBAL
    }

    fn cell(&self, type_name: &str) -> WrapperCell {
        // a panic while holding the lock cannot leave the map half-updated
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            cache
                .entry(type_name.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }

    /// Wrapper for a type name, built on first use
    ///
    /// Concurrent first calls for the same type build it once and all
    /// callers receive the same `Arc`. A failed build is not cached. Both a
    /// candidate the locator cannot resolve and a malformed or incompatible
    /// definition fail with [`ConfigError::InvalidPluginDefinition`].
    pub fn wrapper_for(&self, type_name: &str) -> ConfigResult<Arc<ConfigWrapper>> {
        let cell = self.cell(type_name);
        cell.get_or_try_init(|| {
            let definition = self
                .locator
                .load(type_name)
                .map_err(|e| ConfigError::invalid_definition(type_name, e.to_string()))?;
            ConfigWrapper::new(definition).map(Arc::new)
        })
        .map(Arc::clone)
    }

    /// Wrapper for a statically known configuration type
    ///
    /// Shares the cache entry of [`ConfigRegistry::wrapper_for`], so the
    /// definition passes the same validation either way.
    pub fn wrapper_for_type<C: ConfigType>(&self) -> ConfigResult<Arc<ConfigWrapper>> {
        let cell = self.cell(C::TYPE_NAME);
        cell.get_or_try_init(|| ConfigWrapper::new(C::definition()).map(Arc::new))
            .map(Arc::clone)
    }

    /// Wrapper for the type of a configuration instance
    pub fn wrapper_for_instance(
        &self,
        instance: &dyn PluginConfig,
    ) -> ConfigResult<Arc<ConfigWrapper>> {
        self.wrapper_for(instance.type_name())
    }

    /// Every resolvable storage plugin, in registration order
    pub fn all_storage_wrappers(&self) -> WrapperIter<'_> {
        self.all_wrappers(Capability::Storage)
    }

    /// Every resolvable filter plugin, in registration order
    pub fn all_filter_wrappers(&self) -> WrapperIter<'_> {
        self.all_wrappers(Capability::Filter)
    }

    /// Every resolvable plugin of a capability
    ///
    /// The sequence is lazy: wrappers are built as it advances, and
    /// candidates that fail to load or validate are logged and skipped.
    pub fn all_wrappers(&self, capability: Capability) -> WrapperIter<'_> {
        WrapperIter {
            registry: self,
            capability,
            candidates: self.locator.candidates(capability).into_iter(),
        }
    }

    /// First storage plugin whose URI prefix starts `uri`
    pub fn storage_wrapper_for(&self, uri: &str) -> ConfigResult<Arc<ConfigWrapper>> {
        self.all_storage_wrappers()
            .find(|wrapper| {
                wrapper
                    .uri_prefix()
                    .is_some_and(|prefix| uri.starts_with(prefix))
            })
            .ok_or_else(|| ConfigError::NoMatchingPlugin {
                kind: "storage",
                key: uri.to_string(),
            })
    }

    /// Filter plugin registered under `cli_name`
    pub fn filter_wrapper_for(&self, cli_name: &str) -> ConfigResult<Arc<ConfigWrapper>> {
        self.all_filter_wrappers()
            .find(|wrapper| wrapper.cli_name() == Some(cli_name))
            .ok_or_else(|| ConfigError::NoMatchingPlugin {
                kind: "filter",
                key: cli_name.to_string(),
            })
    }

    /// Create and populate a storage configuration from its URI
    pub fn storage_config_from_uri(
        &self,
        uri: &str,
    ) -> ConfigResult<(Arc<ConfigWrapper>, Box<dyn PluginConfig>)> {
        let wrapper = self.storage_wrapper_for(uri)?;
        let config = wrapper.from_uri(uri)?;
        Ok((wrapper, config))
    }

    /// Populate a configuration instance from a URI
    pub fn parse_uri(&self, instance: &mut dyn PluginConfig, uri: &str) -> ConfigResult<()> {
        self.wrapper_for_instance(instance)?.parse_uri(instance, uri)
    }

    /// Render the URI addressing a configuration instance
    pub fn generate_uri(&self, instance: &dyn PluginConfig) -> ConfigResult<String> {
        self.wrapper_for_instance(instance)?.generate_uri(instance)
    }

    /// Summary of a configuration instance
    pub fn summarize(&self, instance: &dyn PluginConfig) -> ConfigResult<String> {
        self.wrapper_for_instance(instance)?.summarize(instance)
    }

    /// Type names with a successfully built wrapper
    pub fn cached_types(&self) -> Vec<String> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = cache
            .iter()
            .filter(|(_, cell)| cell.get().is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::with_builtin_plugins()
    }
}

/// Lazy sequence of wrappers for one capability
pub struct WrapperIter<'a> {
    registry: &'a ConfigRegistry,
    capability: Capability,
    candidates: std::vec::IntoIter<PluginCandidate>,
}

impl fmt::Debug for WrapperIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapperIter")
            .field("capability", &self.capability)
            .field("remaining", &self.candidates.len())
            .finish()
    }
}

impl Iterator for WrapperIter<'_> {
    type Item = Arc<ConfigWrapper>;

    fn next(&mut self) -> Option<Self::Item> {
        for candidate in self.candidates.by_ref() {
            match self.registry.wrapper_for(&candidate.type_name) {
                Ok(wrapper) if wrapper.capability() == self.capability => {
                    debug!("Found {} plugin {}", self.capability, candidate.type_name);
                    return Some(wrapper);
                }
                Ok(wrapper) => warn!(
                    "Plugin {} is listed as {} but declares {}, skipping",
                    candidate.type_name,
                    self.capability,
                    wrapper.capability()
                ),
                Err(e) => warn!(
                    "Could not load {} plugin {}: {}",
                    self.capability, candidate.type_name, e
                ),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.candidates.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{OptionSpec, PluginDefinition};
    use crate::plugins::{FilesystemConfig, RestoreAclConfig};

    #[derive(Debug, Clone, Default)]
    struct Broken;

    impl ConfigType for Broken {
        const TYPE_NAME: &'static str = "Broken";

        fn definition() -> PluginDefinition {
            PluginDefinition::storage::<Self>("broken:")
                .option(OptionSpec::new("dangling", "never bound"))
                .build()
        }
    }

    #[test]
    fn test_wrapper_for_is_cached() {
        let registry = ConfigRegistry::with_builtin_plugins();
        let first = registry.wrapper_for("FilesystemConfig").unwrap();
        let second = registry.wrapper_for_type::<FilesystemConfig>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.cached_types(), vec!["FilesystemConfig".to_string()]);
    }

    #[test]
    fn test_malformed_definition_is_not_cached() {
        let registry = ConfigRegistry::new(
            PluginManifest::new()
                .register::<Broken>(Capability::Storage)
                .register::<FilesystemConfig>(Capability::Storage),
        );
        assert!(matches!(
            registry.wrapper_for("Broken"),
            Err(ConfigError::InvalidPluginDefinition { .. })
        ));
        // still failing, never a stale success
        assert!(registry.wrapper_for("Broken").is_err());
        assert!(registry.cached_types().is_empty());

        let storage: Vec<_> = registry
            .all_storage_wrappers()
            .map(|w| w.type_name())
            .collect();
        assert_eq!(storage, vec!["FilesystemConfig"]);
    }

    #[test]
    fn test_capability_mismatch_is_skipped() {
        let registry = ConfigRegistry::new(
            PluginManifest::new()
                .register::<RestoreAclConfig>(Capability::Storage)
                .register::<FilesystemConfig>(Capability::Storage),
        );
        let storage: Vec<_> = registry
            .all_storage_wrappers()
            .map(|w| w.type_name())
            .collect();
        assert_eq!(storage, vec!["FilesystemConfig"]);
    }

    #[test]
    fn test_enumeration_is_restartable() {
        let registry = ConfigRegistry::with_builtin_plugins();
        let first: Vec<_> = registry.all_filter_wrappers().map(|w| w.type_name()).collect();
        let second: Vec<_> = registry.all_filter_wrappers().map(|w| w.type_name()).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["GladinetMappingConfig", "RestoreAclConfig"]);
    }

    #[test]
    fn test_global_registry_resolves_builtin_storage() {
        let wrapper = ConfigRegistry::global()
            .storage_wrapper_for("file:///tmp/data")
            .unwrap();
        assert_eq!(wrapper.type_name(), "FilesystemConfig");
    }
}
