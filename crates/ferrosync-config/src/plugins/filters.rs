//! Built-in filter plugins

use crate::definition::{ConfigType, OptionSpec, PluginDefinition};

/// Configuration of the Gladinet mapping filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GladinetMappingConfig {
    /// Base directory in Gladinet that content is loaded into
    pub gladinet_dir: Option<String>,
}

impl ConfigType for GladinetMappingConfig {
    const TYPE_NAME: &'static str = "GladinetMappingConfig";

    fn definition() -> PluginDefinition {
        PluginDefinition::filter::<Self>("gladinet-mapping")
            .label("Gladinet Mapper")
            .documentation(
                "Creates the metadata needed to upload data in a layout compatible with \
                 Gladinet Cloud Desktop when it is hosted on object storage.",
            )
            .option(
                OptionSpec::new(
                    "gladinetDir",
                    "Sets the base directory in Gladinet to load content into. This directory must \
                     already exist.",
                )
                .required()
                .order(10)
                .value_hint("base-directory")
                .bind(|c: &Self| &c.gladinet_dir, |c: &mut Self| &mut c.gladinet_dir),
            )
            .build()
    }
}

/// Configuration of the ACL restore filter; it has no options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreAclConfig;

impl ConfigType for RestoreAclConfig {
    const TYPE_NAME: &'static str = "RestoreAclConfig";

    fn definition() -> PluginDefinition {
        PluginDefinition::filter::<Self>("restore-acl")
            .label("Restore Preserved ACLs")
            .documentation(
                "Reads preserved ACLs from user metadata and restores them to each object.",
            )
            .build()
    }
}
