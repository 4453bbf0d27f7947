//! Descriptive metadata for plugin configuration types
//!
//! A [`ConfigDescriptor`] is the read-only view a [`crate::ConfigWrapper`]
//! exposes over a plugin: its role, label, documentation and the ordered
//! list of [`OptionDescriptor`]s used for CLI synthesis and summaries.

use std::fmt;

/// Separator used when a multi-valued option is rendered or parsed
pub const LIST_SEPARATOR: char = ',';

/// Which extension point a plugin serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Source or target storage addressed by URI
    Storage,
    /// Object filter addressed by CLI name
    Filter,
}

impl Capability {
    /// Lower-case name used in messages
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Filter => "filter",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a plugin together with its lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginRole {
    /// Storage plugin matched by URI prefix
    Storage {
        /// Prefix every URI of this plugin starts with, e.g. `file:`
        uri_prefix: &'static str,
    },
    /// Filter plugin matched by CLI name
    Filter {
        /// Name used on the command line, e.g. `restore-acl`
        cli_name: &'static str,
    },
}

impl PluginRole {
    /// Capability this role provides
    pub fn capability(self) -> Capability {
        match self {
            Self::Storage { .. } => Capability::Storage,
            Self::Filter { .. } => Capability::Filter,
        }
    }

    /// URI prefix for storage plugins
    pub fn uri_prefix(self) -> Option<&'static str> {
        match self {
            Self::Storage { uri_prefix } => Some(uri_prefix),
            Self::Filter { .. } => None,
        }
    }

    /// CLI name for filter plugins
    pub fn cli_name(self) -> Option<&'static str> {
        match self {
            Self::Filter { cli_name } => Some(cli_name),
            Self::Storage { .. } => None,
        }
    }
}

/// Value type of a configuration property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// true / false
    Bool,
    /// Signed integer
    Integer,
    /// Free-form string
    Text,
    /// Ordered list of strings
    TextList,
}

/// How many values an option takes on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueArity {
    /// Presence-only flag
    #[default]
    None,
    /// Exactly one value
    Single,
    /// One or more values, comma separated or repeated
    Multi,
}

impl ValueArity {
    /// Arity implied by a value type when the option does not override it
    pub fn natural(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Bool => Self::None,
            ValueType::Integer | ValueType::Text => Self::Single,
            ValueType::TextList => Self::Multi,
        }
    }
}

/// A typed configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// String value
    Text(String),
    /// List value
    TextList(Vec<String>),
}

impl OptionValue {
    /// Type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Integer(_) => ValueType::Integer,
            Self::Text(_) => ValueType::Text,
            Self::TextList(_) => ValueType::TextList,
        }
    }

    /// Parse raw command-line text into a value of the given type
    pub fn parse(value_type: ValueType, raw: &str) -> Result<Self, String> {
        match value_type {
            ValueType::Bool => raw
                .trim()
                .parse::<bool>()
                .map(Self::Bool)
                .map_err(|_| format!("expected true or false, got '{}'", raw)),
            ValueType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Self::Integer)
                .map_err(|_| format!("expected an integer, got '{}'", raw)),
            ValueType::Text => Ok(Self::Text(raw.to_string())),
            ValueType::TextList => Ok(Self::TextList(
                raw.split(LIST_SEPARATOR).map(str::to_string).collect(),
            )),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Text(value) => f.write_str(value),
            Self::TextList(values) => f.write_str(&join(values)),
        }
    }
}

/// Conversion between a configuration field and [`OptionValue`]
///
/// `to_value` returns `None` when the field is unset, which keeps it out of
/// summaries and required-option checks.
pub trait OptionField: Sized {
    /// Value type the field maps to
    const VALUE_TYPE: ValueType;

    /// Current value, if populated
    fn to_value(&self) -> Option<OptionValue>;

    /// Convert a value into the field type
    fn from_value(value: OptionValue) -> Result<Self, String>;
}

fn type_error(expected: ValueType, value: &OptionValue) -> String {
    format!("expected {:?} value, got {:?}", expected, value.value_type())
}

impl OptionField for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;

    fn to_value(&self) -> Option<OptionValue> {
        Some(OptionValue::Bool(*self))
    }

    fn from_value(value: OptionValue) -> Result<Self, String> {
        match value {
            OptionValue::Bool(b) => Ok(b),
            other => Err(type_error(Self::VALUE_TYPE, &other)),
        }
    }
}

impl OptionField for i64 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn to_value(&self) -> Option<OptionValue> {
        Some(OptionValue::Integer(*self))
    }

    fn from_value(value: OptionValue) -> Result<Self, String> {
        match value {
            OptionValue::Integer(n) => Ok(n),
            other => Err(type_error(Self::VALUE_TYPE, &other)),
        }
    }
}

impl OptionField for Option<u16> {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn to_value(&self) -> Option<OptionValue> {
        self.map(|n| OptionValue::Integer(i64::from(n)))
    }

    fn from_value(value: OptionValue) -> Result<Self, String> {
        match value {
            OptionValue::Integer(n) => u16::try_from(n)
                .map(Some)
                .map_err(|_| format!("{} is out of range 0-65535", n)),
            other => Err(type_error(Self::VALUE_TYPE, &other)),
        }
    }
}

impl OptionField for Option<String> {
    const VALUE_TYPE: ValueType = ValueType::Text;

    fn to_value(&self) -> Option<OptionValue> {
        self.clone().map(OptionValue::Text)
    }

    fn from_value(value: OptionValue) -> Result<Self, String> {
        match value {
            OptionValue::Text(s) => Ok(Some(s)),
            other => Err(type_error(Self::VALUE_TYPE, &other)),
        }
    }
}

impl OptionField for Vec<String> {
    const VALUE_TYPE: ValueType = ValueType::TextList;

    fn to_value(&self) -> Option<OptionValue> {
        if self.is_empty() {
            None
        } else {
            Some(OptionValue::TextList(self.clone()))
        }
    }

    fn from_value(value: OptionValue) -> Result<Self, String> {
        match value {
            OptionValue::TextList(values) => Ok(values),
            OptionValue::Text(s) => Ok(vec![s]),
            other => Err(type_error(Self::VALUE_TYPE, &other)),
        }
    }
}

/// CLI-facing description of one configuration property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescriptor {
    /// Property name on the configuration type, e.g. `deleteOlderThan`
    pub property: &'static str,
    /// Long option name without prefix, e.g. `delete-older-than`
    pub cli_name: String,
    /// Value type of the property
    pub value_type: ValueType,
    /// Number of values taken on the command line
    pub arity: ValueArity,
    /// Whether a value must be supplied
    pub required: bool,
    /// Presence of the flag sets the property to false
    pub inverted: bool,
    /// Placeholder shown in help output
    pub value_hint: String,
    /// Help text
    pub description: &'static str,
    /// Sort key; lower values come first
    pub order: i32,
    /// Value is masked in summaries
    pub sensitive: bool,
}

impl OptionDescriptor {
    /// Long option name with an optional prefix prepended
    pub fn long_name(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) => format!("{}{}", prefix, self.cli_name),
            None => self.cli_name.clone(),
        }
    }

    /// Whether the option is a presence-only flag
    pub fn is_flag(&self) -> bool {
        self.arity == ValueArity::None
    }
}

/// Read-only description of a plugin configuration type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDescriptor {
    /// Type name used as the registry key
    pub type_name: &'static str,
    /// Storage or filter role with its lookup key
    pub role: PluginRole,
    /// Human-readable label
    pub label: &'static str,
    /// Longer documentation shown by `describe`
    pub documentation: &'static str,
    /// Options sorted by order, then declaration order
    pub options: Vec<OptionDescriptor>,
}

/// Convert a camelCase property name into a hyphenated CLI name
///
/// Words start at an uppercase letter that follows a lowercase letter or
/// digit, or that ends a run of capitals followed by lowercase. A run of
/// capitals stays one word: `deleteOlderThan` becomes `delete-older-than`
/// and `URLPath` becomes `url-path`.
pub fn hyphenate(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut hyphenated = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                hyphenated.push('-');
            }
        }
        hyphenated.extend(c.to_lowercase());
    }
    hyphenated
}

/// Join list values with the list separator
pub fn join<S: AsRef<str>>(values: &[S]) -> String {
    let mut joined = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            joined.push(LIST_SEPARATOR);
        }
        joined.push_str(value.as_ref());
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("deleteOlderThan", "delete-older-than")]
    #[case("path", "path")]
    #[case("useAbsolutePath", "use-absolute-path")]
    #[case("Path", "path")]
    #[case("URLPath", "url-path")]
    #[case("sourceURL", "source-url")]
    #[case("useHTTPSProxy", "use-https-proxy")]
    #[case("md5Checksum", "md5-checksum")]
    #[case("", "")]
    fn test_hyphenate(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(hyphenate(input), expected);
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&["a", "b", "c"]), "a,b,c");
        assert_eq!(join::<&str>(&[]), "");
        assert_eq!(join(&["only".to_string()]), "only");
    }

    #[rstest]
    #[case(ValueType::Bool, "true", OptionValue::Bool(true))]
    #[case(ValueType::Integer, "42", OptionValue::Integer(42))]
    #[case(ValueType::Text, "a,b", OptionValue::Text("a,b".to_string()))]
    #[case(
        ValueType::TextList,
        "a,b",
        OptionValue::TextList(vec!["a".to_string(), "b".to_string()])
    )]
    fn test_option_value_parse(
        #[case] value_type: ValueType,
        #[case] raw: &str,
        #[case] expected: OptionValue,
    ) {
        assert_eq!(OptionValue::parse(value_type, raw).unwrap(), expected);
    }

    #[test]
    fn test_option_value_parse_rejects_bad_integer() {
        assert!(OptionValue::parse(ValueType::Integer, "ten").is_err());
        assert!(OptionValue::parse(ValueType::Bool, "yes").is_err());
    }

    #[test]
    fn test_port_field_range() {
        assert_eq!(
            <Option<u16>>::from_value(OptionValue::Integer(9020)).unwrap(),
            Some(9020)
        );
        assert!(<Option<u16>>::from_value(OptionValue::Integer(70000)).is_err());
        assert!(<Option<u16>>::from_value(OptionValue::Text("80".into())).is_err());
    }

    #[test]
    fn test_empty_list_is_unpopulated() {
        assert_eq!(Vec::<String>::new().to_value(), None);
        assert_eq!(None::<String>.to_value(), None);
        assert_eq!(false.to_value(), Some(OptionValue::Bool(false)));
    }

    proptest! {
        #[test]
        fn test_hyphenate_output_is_lowercase(name in "[a-zA-Z]{0,24}") {
            let hyphenated = hyphenate(&name);
            prop_assert!(!hyphenated.chars().any(char::is_uppercase));
            prop_assert!(!hyphenated.starts_with('-'));
            prop_assert!(!hyphenated.ends_with('-'));
            prop_assert!(!hyphenated.contains("--"));
            prop_assert_eq!(hyphenated.replace('-', ""), name.to_lowercase());
        }

        #[test]
        fn test_hyphenate_is_idempotent(name in "[a-zA-Z]{0,24}") {
            let once = hyphenate(&name);
            prop_assert_eq!(hyphenate(&once), once.clone());
        }
    }
}
