//! Plugin discovery
//!
//! A [`PluginLocator`] enumerates candidate type names per capability and
//! resolves a name to its [`PluginDefinition`]. The built-in
//! [`PluginManifest`] is an explicit, ordered registration table; the order
//! of storage entries is the order URI prefixes are tried in.

use crate::definition::{ConfigType, PluginDefinition};
use crate::descriptor::Capability;
use crate::error::PluginLoadError;
use crate::plugins::{
    EcsNamespaceCopyConfig, FilesystemConfig, GladinetMappingConfig, RestoreAclConfig,
};

/// A type name advertised as providing a capability
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginCandidate {
    /// Registry key of the configuration type
    pub type_name: String,
    /// Capability the candidate claims
    pub capability: Capability,
}

/// Source of plugin candidates and definitions
pub trait PluginLocator: Send + Sync {
    /// Candidates claiming `capability`, in lookup order
    fn candidates(&self, capability: Capability) -> Vec<PluginCandidate>;

    /// Resolve a type name into its definition
    ///
    /// API version compatibility is checked when the wrapper is built.
    fn load(&self, type_name: &str) -> Result<PluginDefinition, PluginLoadError>;
}

#[derive(Debug, Clone)]
struct ManifestEntry {
    type_name: &'static str,
    capability: Capability,
    define: Option<fn() -> PluginDefinition>,
}

/// Ordered, compile-time registration table of plugin types
#[derive(Debug, Clone, Default)]
pub struct PluginManifest {
    entries: Vec<ManifestEntry>,
}

impl PluginManifest {
    /// Empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest of the plugins shipped with FerroSync
    pub fn builtin() -> Self {
        Self::new()
            .register::<FilesystemConfig>(Capability::Storage)
            .register::<EcsNamespaceCopyConfig>(Capability::Storage)
            .register::<GladinetMappingConfig>(Capability::Filter)
            .register::<RestoreAclConfig>(Capability::Filter)
    }

    /// Register a configuration type under a capability
    pub fn register<C: ConfigType>(mut self, capability: Capability) -> Self {
        self.entries.push(ManifestEntry {
            type_name: C::TYPE_NAME,
            capability,
            define: Some(C::definition),
        });
        self
    }

    /// Advertise a type name that has no definition in this build
    ///
    /// Enumeration skips such entries with a warning.
    pub fn declare(mut self, type_name: &'static str, capability: Capability) -> Self {
        self.entries.push(ManifestEntry {
            type_name,
            capability,
            define: None,
        });
        self
    }

    /// Number of entries, resolvable or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PluginLocator for PluginManifest {
    fn candidates(&self, capability: Capability) -> Vec<PluginCandidate> {
        self.entries
            .iter()
            .filter(|entry| entry.capability == capability)
            .map(|entry| PluginCandidate {
                type_name: entry.type_name.to_string(),
                capability,
            })
            .collect()
    }

    fn load(&self, type_name: &str) -> Result<PluginDefinition, PluginLoadError> {
        self.entries
            .iter()
            .find(|entry| entry.type_name == type_name)
            .and_then(|entry| entry.define)
            .map(|define| define())
            .ok_or_else(|| PluginLoadError::NotFound {
                type_name: type_name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_candidates_keep_registration_order() {
        let manifest = PluginManifest::builtin();
        let storage: Vec<_> = manifest
            .candidates(Capability::Storage)
            .into_iter()
            .map(|c| c.type_name)
            .collect();
        assert_eq!(storage, vec!["FilesystemConfig", "EcsNamespaceCopyConfig"]);

        let filters = manifest.candidates(Capability::Filter);
        assert_eq!(filters.len(), 2);
        assert!(filters.iter().all(|c| c.capability == Capability::Filter));
    }

    #[test]
    fn test_declared_entry_is_not_found() {
        let manifest = PluginManifest::new().declare("AtmosConfig", Capability::Storage);
        assert_eq!(manifest.len(), 1);
        let err = manifest.load("AtmosConfig").unwrap_err();
        assert!(matches!(err, PluginLoadError::NotFound { .. }));
        assert!(matches!(
            manifest.load("Unknown"),
            Err(PluginLoadError::NotFound { .. })
        ));
    }
}
