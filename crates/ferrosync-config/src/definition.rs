//! Plugin definitions
//!
//! Every plugin configuration type declares its options, role and URI
//! binding once, through [`ConfigType::definition`]. The registry turns a
//! [`PluginDefinition`] into a validated [`crate::ConfigWrapper`]; nothing
//! here inspects types at runtime beyond `Any` downcasts of the instance
//! the accessors were bound to.

use crate::descriptor::{OptionField, OptionValue, PluginRole, ValueArity, ValueType};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Plugin API version understood by this build
pub const PLUGIN_API_VERSION: u32 = 1;

/// Object-safe view of a plugin configuration instance
pub trait PluginConfig: Any + Send + Sync + fmt::Debug {
    /// Registry key of the configuration type
    fn type_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Clone behind the trait object
    fn clone_boxed(&self) -> Box<dyn PluginConfig>;
}

/// Statically declared plugin configuration type
pub trait ConfigType: Any + Default + Clone + Send + Sync + fmt::Debug {
    /// Registry key, unique across all plugins
    const TYPE_NAME: &'static str;

    /// Declare role, options and URI binding
    fn definition() -> PluginDefinition;
}

impl<C: ConfigType> PluginConfig for C {
    fn type_name(&self) -> &'static str {
        C::TYPE_NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn PluginConfig> {
        Box::new(self.clone())
    }
}

impl dyn PluginConfig {
    /// Borrow as a concrete configuration type
    pub fn downcast_ref<C: ConfigType>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }

    /// Mutably borrow as a concrete configuration type
    pub fn downcast_mut<C: ConfigType>(&mut self) -> Option<&mut C> {
        self.as_any_mut().downcast_mut::<C>()
    }
}

impl Clone for Box<dyn PluginConfig> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

type Getter = Arc<dyn Fn(&dyn PluginConfig) -> Option<OptionValue> + Send + Sync>;
type Setter = Arc<dyn Fn(&mut dyn PluginConfig, OptionValue) -> Result<(), String> + Send + Sync>;
type UriGenerator = Arc<dyn Fn(&dyn PluginConfig) -> Option<String> + Send + Sync>;
type UriParser = Arc<dyn Fn(&mut dyn PluginConfig, &str) -> Result<(), String> + Send + Sync>;

const MISMATCH: &str = "configuration instance has the wrong type";

/// Declaration of one configurable property
///
/// Built with [`OptionSpec::new`] and bound to a field with
/// [`OptionSpec::bind`]. An unbound spec is rejected when the wrapper is
/// built.
#[derive(Clone)]
pub struct OptionSpec {
    pub(crate) property: &'static str,
    pub(crate) description: &'static str,
    pub(crate) value_type: ValueType,
    pub(crate) arity: Option<ValueArity>,
    pub(crate) required: bool,
    pub(crate) cli_name: Option<&'static str>,
    pub(crate) inverted: bool,
    pub(crate) value_hint: Option<&'static str>,
    pub(crate) order: i32,
    pub(crate) sensitive: bool,
    pub(crate) owner: Option<TypeId>,
    pub(crate) getter: Option<Getter>,
    pub(crate) setter: Option<Setter>,
}

impl OptionSpec {
    /// Start declaring a property
    pub fn new(property: &'static str, description: &'static str) -> Self {
        Self {
            property,
            description,
            value_type: ValueType::Text,
            arity: None,
            required: false,
            cli_name: None,
            inverted: false,
            value_hint: None,
            order: 0,
            sensitive: false,
            owner: None,
            getter: None,
            setter: None,
        }
    }

    /// Bind the property to a field of the configuration type
    pub fn bind<C, T, G, S>(mut self, get: G, set: S) -> Self
    where
        C: ConfigType,
        T: OptionField + 'static,
        G: Fn(&C) -> &T + Send + Sync + 'static,
        S: Fn(&mut C) -> &mut T + Send + Sync + 'static,
    {
        self.value_type = T::VALUE_TYPE;
        self.owner = Some(TypeId::of::<C>());
        self.getter = Some(Arc::new(move |config: &dyn PluginConfig| {
            config
                .as_any()
                .downcast_ref::<C>()
                .and_then(|c| get(c).to_value())
        }));
        self.setter = Some(Arc::new(
            move |config: &mut dyn PluginConfig, value: OptionValue| {
                let c = config
                    .as_any_mut()
                    .downcast_mut::<C>()
                    .ok_or_else(|| MISMATCH.to_string())?;
                *set(c) = T::from_value(value)?;
                Ok(())
            },
        ));
        self
    }

    /// Mark the property as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the hyphenated CLI name
    pub fn cli_name(mut self, name: &'static str) -> Self {
        self.cli_name = Some(name);
        self
    }

    /// Boolean flag whose presence sets the property to false
    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    /// Placeholder shown in help output
    pub fn value_hint(mut self, hint: &'static str) -> Self {
        self.value_hint = Some(hint);
        self
    }

    /// Sort key; lower values come first
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Mask the value in summaries
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Override the arity implied by the value type
    pub fn arity(mut self, arity: ValueArity) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Property name
    pub fn property(&self) -> &'static str {
        self.property
    }

    pub(crate) fn effective_arity(&self) -> ValueArity {
        self.arity
            .unwrap_or_else(|| ValueArity::natural(self.value_type))
    }

    pub(crate) fn get(&self, config: &dyn PluginConfig) -> Option<OptionValue> {
        self.getter.as_ref().and_then(|get| get(config))
    }

    pub(crate) fn set(
        &self,
        config: &mut dyn PluginConfig,
        value: OptionValue,
    ) -> Result<(), String> {
        match &self.setter {
            Some(set) => set(config, value),
            None => Err(format!("property {} is not bound", self.property)),
        }
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("property", &self.property)
            .field("value_type", &self.value_type)
            .field("arity", &self.arity)
            .field("required", &self.required)
            .field("order", &self.order)
            .field("bound", &self.getter.is_some())
            .finish()
    }
}

/// Conversion between a storage plugin's configuration and its URI
#[derive(Clone)]
pub struct UriBinding {
    pub(crate) generate: UriGenerator,
    pub(crate) parse: UriParser,
}

impl fmt::Debug for UriBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UriBinding")
    }
}

/// Complete declaration of a plugin configuration type
#[derive(Debug, Clone)]
pub struct PluginDefinition {
    pub(crate) type_name: &'static str,
    pub(crate) type_id: TypeId,
    pub(crate) role: PluginRole,
    pub(crate) label: &'static str,
    pub(crate) documentation: &'static str,
    pub(crate) api_version: u32,
    pub(crate) options: Vec<OptionSpec>,
    pub(crate) uri: Option<UriBinding>,
    pub(crate) create: fn() -> Box<dyn PluginConfig>,
}

fn create_default<C: ConfigType>() -> Box<dyn PluginConfig> {
    Box::new(C::default())
}

impl PluginDefinition {
    /// Start a storage plugin definition
    pub fn storage<C: ConfigType>(uri_prefix: &'static str) -> DefinitionBuilder<C> {
        DefinitionBuilder::new(PluginRole::Storage { uri_prefix })
    }

    /// Start a filter plugin definition
    pub fn filter<C: ConfigType>(cli_name: &'static str) -> DefinitionBuilder<C> {
        DefinitionBuilder::new(PluginRole::Filter { cli_name })
    }

    /// Registry key of the described type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Role of the plugin
    pub fn role(&self) -> PluginRole {
        self.role
    }

    /// Plugin API version the definition was written against
    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Declared options in declaration order
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }
}

/// Typed builder for [`PluginDefinition`]
#[derive(Debug)]
pub struct DefinitionBuilder<C> {
    definition: PluginDefinition,
    _config: std::marker::PhantomData<fn() -> C>,
}

impl<C: ConfigType> DefinitionBuilder<C> {
    fn new(role: PluginRole) -> Self {
        Self {
            definition: PluginDefinition {
                type_name: C::TYPE_NAME,
                type_id: TypeId::of::<C>(),
                role,
                label: C::TYPE_NAME,
                documentation: "",
                api_version: PLUGIN_API_VERSION,
                options: Vec::new(),
                uri: None,
                create: create_default::<C>,
            },
            _config: std::marker::PhantomData,
        }
    }

    /// Human-readable label
    pub fn label(mut self, label: &'static str) -> Self {
        self.definition.label = label;
        self
    }

    /// Documentation shown by `describe`
    pub fn documentation(mut self, documentation: &'static str) -> Self {
        self.definition.documentation = documentation;
        self
    }

    /// Override the plugin API version the definition targets
    pub fn api_version(mut self, version: u32) -> Self {
        self.definition.api_version = version;
        self
    }

    /// Add an option
    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.definition.options.push(spec);
        self
    }

    /// Bind URI generation and parsing
    ///
    /// `parse` receives the full URI, prefix included.
    pub fn uri(
        mut self,
        generate: fn(&C) -> String,
        parse: fn(&mut C, &str) -> Result<(), String>,
    ) -> Self {
        self.definition.uri = Some(UriBinding {
            generate: Arc::new(move |config: &dyn PluginConfig| {
                config.as_any().downcast_ref::<C>().map(generate)
            }),
            parse: Arc::new(move |config: &mut dyn PluginConfig, uri: &str| {
                let c = config
                    .as_any_mut()
                    .downcast_mut::<C>()
                    .ok_or_else(|| MISMATCH.to_string())?;
                parse(c, uri)
            }),
        });
        self
    }

    /// Finish the definition
    pub fn build(self) -> PluginDefinition {
        self.definition
    }
}
