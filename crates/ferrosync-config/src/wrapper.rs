//! Validated, cached view over a plugin configuration type

use crate::definition::{
    OptionSpec, PluginConfig, PluginDefinition, UriBinding, PLUGIN_API_VERSION,
};
use crate::descriptor::{
    hyphenate, Capability, ConfigDescriptor, OptionDescriptor, OptionValue, PluginRole,
    ValueArity, ValueType,
};
use crate::error::{ConfigError, ConfigResult};
use std::any::TypeId;
use std::collections::HashSet;
use tracing::debug;

const MASK: &str = "******";

/// Descriptor plus bound accessors for one plugin configuration type
///
/// Wrappers are built once per type by the [`crate::ConfigRegistry`] and
/// shared read-only afterwards.
#[derive(Debug)]
pub struct ConfigWrapper {
    descriptor: ConfigDescriptor,
    type_id: TypeId,
    specs: Vec<OptionSpec>,
    uri: Option<UriBinding>,
    create: fn() -> Box<dyn PluginConfig>,
}

impl ConfigWrapper {
    /// Validate a definition and build its wrapper
    pub fn new(definition: PluginDefinition) -> ConfigResult<Self> {
        let PluginDefinition {
            type_name,
            type_id,
            role,
            label,
            documentation,
            api_version,
            options,
            uri,
            create,
        } = definition;

        let invalid = |message: String| ConfigError::invalid_definition(type_name, message);

        if type_name.trim().is_empty() {
            return Err(invalid("type name is empty".to_string()));
        }
        if api_version != PLUGIN_API_VERSION {
            return Err(invalid(format!(
                "targets plugin API v{}, this build supports v{}",
                api_version, PLUGIN_API_VERSION
            )));
        }
        match role {
            PluginRole::Storage { uri_prefix } => {
                if uri_prefix.is_empty() || !uri_prefix.ends_with(':') {
                    return Err(invalid(format!(
                        "URI prefix '{}' must be non-empty and end with ':'",
                        uri_prefix
                    )));
                }
                if uri.is_none() {
                    return Err(invalid("storage plugin declares no URI binding".to_string()));
                }
            }
            PluginRole::Filter { cli_name } => {
                if cli_name.is_empty() || cli_name.chars().any(char::is_whitespace) {
                    return Err(invalid(format!("CLI name '{}' is not usable", cli_name)));
                }
            }
        }

        let mut properties = HashSet::new();
        let mut cli_names = HashSet::new();
        let mut indexed = Vec::with_capacity(options.len());
        for (position, spec) in options.into_iter().enumerate() {
            if spec.property.is_empty() {
                return Err(invalid(format!("option #{} has no property name", position)));
            }
            if spec.getter.is_none() || spec.setter.is_none() {
                return Err(invalid(format!("option {} is not bound to a field", spec.property)));
            }
            if spec.owner != Some(type_id) {
                return Err(invalid(format!(
                    "option {} is bound to another configuration type",
                    spec.property
                )));
            }
            let arity = spec.effective_arity();
            if spec.inverted && spec.value_type != ValueType::Bool {
                return Err(invalid(format!(
                    "option {} is inverted but not boolean",
                    spec.property
                )));
            }
            if arity == ValueArity::None && spec.value_type != ValueType::Bool {
                return Err(invalid(format!(
                    "option {} takes no value but is not boolean",
                    spec.property
                )));
            }
            if arity == ValueArity::Multi && spec.value_type != ValueType::TextList {
                return Err(invalid(format!(
                    "option {} takes multiple values but is not a list",
                    spec.property
                )));
            }
            if !properties.insert(spec.property) {
                return Err(invalid(format!("option {} is declared twice", spec.property)));
            }
            let descriptor = describe_option(&spec, arity);
            if !cli_names.insert(descriptor.cli_name.clone()) {
                return Err(invalid(format!(
                    "CLI name {} is used by more than one option",
                    descriptor.cli_name
                )));
            }
            indexed.push((descriptor, spec));
        }

        // stable, so equal orders keep declaration order
        indexed.sort_by_key(|(descriptor, _)| descriptor.order);
        let (descriptors, specs): (Vec<_>, Vec<_>) = indexed.into_iter().unzip();

        debug!(
            "Built config wrapper for {} with {} options",
            type_name,
            descriptors.len()
        );

        Ok(Self {
            descriptor: ConfigDescriptor {
                type_name,
                role,
                label,
                documentation,
                options: descriptors,
            },
            type_id,
            specs,
            uri,
            create,
        })
    }

    /// Read-only descriptor
    pub fn descriptor(&self) -> &ConfigDescriptor {
        &self.descriptor
    }

    /// Registry key of the wrapped type
    pub fn type_name(&self) -> &'static str {
        self.descriptor.type_name
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        self.descriptor.label
    }

    /// Documentation text
    pub fn documentation(&self) -> &'static str {
        self.descriptor.documentation
    }

    /// Capability of the plugin
    pub fn capability(&self) -> Capability {
        self.descriptor.role.capability()
    }

    /// URI prefix, for storage plugins
    pub fn uri_prefix(&self) -> Option<&'static str> {
        self.descriptor.role.uri_prefix()
    }

    /// CLI name, for filter plugins
    pub fn cli_name(&self) -> Option<&'static str> {
        self.descriptor.role.cli_name()
    }

    /// Ordered CLI option descriptors
    pub fn cli_options(&self) -> &[OptionDescriptor] {
        &self.descriptor.options
    }

    /// Fresh configuration instance with default values
    pub fn create(&self) -> Box<dyn PluginConfig> {
        (self.create)()
    }

    /// Whether `instance` is of the wrapped type
    pub fn accepts(&self, instance: &dyn PluginConfig) -> bool {
        instance.as_any().type_id() == self.type_id
    }

    fn check_type(&self, instance: &dyn PluginConfig) -> ConfigResult<()> {
        if self.accepts(instance) {
            Ok(())
        } else {
            Err(ConfigError::TypeMismatch {
                expected: self.type_name().to_string(),
                actual: instance.type_name().to_string(),
            })
        }
    }

    fn uri_binding(&self) -> ConfigResult<&UriBinding> {
        self.uri.as_ref().ok_or_else(|| ConfigError::UnsupportedOperation {
            type_name: self.type_name().to_string(),
            operation: "URI addressing",
        })
    }

    /// Populate `instance` from a URI
    pub fn parse_uri(&self, instance: &mut dyn PluginConfig, uri: &str) -> ConfigResult<()> {
        self.check_type(instance)?;
        let binding = self.uri_binding()?;
        if let Some(prefix) = self.uri_prefix() {
            if !uri.starts_with(prefix) {
                return Err(ConfigError::invalid_uri(
                    uri,
                    format!("expected prefix '{}'", prefix),
                ));
            }
        }
        (binding.parse)(instance, uri).map_err(|reason| ConfigError::invalid_uri(uri, reason))
    }

    /// Create an instance and populate it from a URI
    pub fn from_uri(&self, uri: &str) -> ConfigResult<Box<dyn PluginConfig>> {
        let mut instance = self.create();
        self.parse_uri(instance.as_mut(), uri)?;
        Ok(instance)
    }

    /// Render the URI addressing `instance`
    pub fn generate_uri(&self, instance: &dyn PluginConfig) -> ConfigResult<String> {
        self.check_type(instance)?;
        let binding = self.uri_binding()?;
        (binding.generate)(instance).ok_or_else(|| ConfigError::TypeMismatch {
            expected: self.type_name().to_string(),
            actual: instance.type_name().to_string(),
        })
    }

    fn spec(&self, property: &str) -> ConfigResult<&OptionSpec> {
        self.specs
            .iter()
            .find(|spec| spec.property == property)
            .ok_or_else(|| ConfigError::invalid_value(property, "unknown option"))
    }

    /// Current value of a property, `None` when unset
    pub fn get(
        &self,
        instance: &dyn PluginConfig,
        property: &str,
    ) -> ConfigResult<Option<OptionValue>> {
        self.check_type(instance)?;
        Ok(self.spec(property)?.get(instance))
    }

    /// Assign a property
    pub fn set(
        &self,
        instance: &mut dyn PluginConfig,
        property: &str,
        value: OptionValue,
    ) -> ConfigResult<()> {
        self.check_type(instance)?;
        self.spec(property)?
            .set(instance, value)
            .map_err(|message| ConfigError::invalid_value(property, message))
    }

    /// Fail with `MissingRequired` for the first required option left unset
    pub fn validate_required(&self, instance: &dyn PluginConfig) -> ConfigResult<()> {
        self.check_type(instance)?;
        for (descriptor, spec) in self.descriptor.options.iter().zip(&self.specs) {
            if descriptor.required && spec.get(instance).is_none() {
                return Err(ConfigError::missing_required(descriptor.cli_name.clone()));
            }
        }
        Ok(())
    }

    /// `property=value` lines for every populated option, in descriptor order
    ///
    /// Sensitive values are masked.
    pub fn summarize(&self, instance: &dyn PluginConfig) -> ConfigResult<String> {
        self.check_type(instance)?;
        let lines: Vec<String> = self
            .descriptor
            .options
            .iter()
            .zip(&self.specs)
            .filter_map(|(descriptor, spec)| {
                spec.get(instance).map(|value| {
                    if descriptor.sensitive {
                        format!("{}={}", descriptor.property, MASK)
                    } else {
                        format!("{}={}", descriptor.property, value)
                    }
                })
            })
            .collect();
        Ok(lines.join("\n"))
    }

    pub(crate) fn options_with_specs(
        &self,
    ) -> impl Iterator<Item = (&OptionDescriptor, &OptionSpec)> {
        self.descriptor.options.iter().zip(&self.specs)
    }
}

fn describe_option(spec: &OptionSpec, arity: ValueArity) -> OptionDescriptor {
    let cli_name = spec
        .cli_name
        .map_or_else(|| hyphenate(spec.property), str::to_string);
    let cli_name = if spec.inverted {
        format!("no-{}", cli_name)
    } else {
        cli_name
    };
    let value_hint = spec
        .value_hint
        .map_or_else(|| cli_name.clone(), str::to_string);
    OptionDescriptor {
        property: spec.property,
        cli_name,
        value_type: spec.value_type,
        arity,
        required: spec.required,
        inverted: spec.inverted,
        value_hint,
        description: spec.description,
        order: spec.order,
        sensitive: spec.sensitive,
    }
}
