//! Command-line option synthesis from plugin descriptors
//!
//! Every option of a wrapper becomes a long-only clap argument. Required
//! options are not marked required in clap; [`ConfigWrapper::parse_cli`]
//! reports them as [`ConfigError::MissingRequired`] instead so that the
//! error carries the option name in FerroSync's own error type.

use crate::definition::PluginConfig;
use crate::descriptor::{OptionDescriptor, OptionValue, ValueArity, ValueType, LIST_SEPARATOR};
use crate::error::{ConfigError, ConfigResult};
use crate::wrapper::ConfigWrapper;
use clap::{Arg, ArgAction, ArgMatches};

fn help_text(option: &OptionDescriptor) -> String {
    if option.required {
        format!("[required] {}", option.description)
    } else {
        option.description.to_string()
    }
}

/// Build the clap argument for one option
pub fn option_arg(option: &OptionDescriptor, prefix: Option<&str>) -> Arg {
    let long_name = option.long_name(prefix);
    let arg = Arg::new(long_name.clone())
        .long(long_name)
        .help(help_text(option));

    match option.arity {
        ValueArity::None => arg.action(ArgAction::SetTrue),
        ValueArity::Single => arg
            .action(ArgAction::Set)
            .num_args(1)
            .value_name(option.value_hint.clone()),
        ValueArity::Multi => arg
            .action(ArgAction::Append)
            .num_args(1..)
            .value_delimiter(LIST_SEPARATOR)
            .value_name(option.value_hint.clone()),
    }
}

impl ConfigWrapper {
    /// clap arguments for every option, in descriptor order
    pub fn cli_args(&self, prefix: Option<&str>) -> Vec<Arg> {
        self.cli_options()
            .iter()
            .map(|option| option_arg(option, prefix))
            .collect()
    }

    /// Build a configuration instance from parsed command-line arguments
    ///
    /// `matches` must come from a command that includes
    /// [`ConfigWrapper::cli_args`] with the same prefix.
    pub fn parse_cli(
        &self,
        matches: &ArgMatches,
        prefix: Option<&str>,
    ) -> ConfigResult<Box<dyn PluginConfig>> {
        let mut instance = self.create();
        self.apply_cli(instance.as_mut(), matches, prefix)?;
        Ok(instance)
    }

    /// Layer command-line arguments over an existing instance
    ///
    /// Only options present in `matches` are assigned, so values taken from
    /// a URI beforehand survive unless a flag names them explicitly.
    pub fn apply_cli(
        &self,
        instance: &mut dyn PluginConfig,
        matches: &ArgMatches,
        prefix: Option<&str>,
    ) -> ConfigResult<()> {
        for (option, _) in self.options_with_specs() {
            let id = option.long_name(prefix);
            if let Some(value) = read_value(matches, option, &id)? {
                self.set(instance, option.property, value)?;
            }
        }

        self.validate_required(instance).map_err(|e| match e {
            ConfigError::MissingRequired { key } => ConfigError::MissingRequired {
                key: format!("--{}{}", prefix.unwrap_or_default(), key),
            },
            other => other,
        })
    }
}

fn read_value(
    matches: &ArgMatches,
    option: &OptionDescriptor,
    id: &str,
) -> ConfigResult<Option<OptionValue>> {
    let lookup_error =
        |e: clap::parser::MatchesError| ConfigError::invalid_value(id, e.to_string());

    match option.arity {
        ValueArity::None => {
            let present = matches
                .try_get_one::<bool>(id)
                .map_err(lookup_error)?
                .copied()
                .unwrap_or(false);
            // absent flags leave the field at its default
            Ok(present.then_some(OptionValue::Bool(!option.inverted)))
        }
        ValueArity::Single => matches
            .try_get_one::<String>(id)
            .map_err(lookup_error)?
            .map(|raw| OptionValue::parse(option.value_type, raw))
            .transpose()
            .map_err(|message| ConfigError::invalid_value(id, message)),
        ValueArity::Multi => {
            let values: Option<Vec<String>> = matches
                .try_get_many::<String>(id)
                .map_err(lookup_error)?
                .map(|values| values.cloned().collect());
            match (values, option.value_type) {
                (Some(values), ValueType::TextList) => Ok(Some(OptionValue::TextList(values))),
                (Some(_), other) => Err(ConfigError::invalid_value(
                    id,
                    format!("{:?} option cannot take multiple values", other),
                )),
                (None, _) => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::definition::ConfigType;
    use crate::plugins::{EcsNamespaceCopyConfig, FilesystemConfig, GladinetMappingConfig};
    use crate::{ConfigError, ConfigWrapper};
    use clap::Command;

    fn command(wrapper: &ConfigWrapper, prefix: Option<&str>) -> Command {
        Command::new("ferrosync")
            .no_binary_name(true)
            .args(wrapper.cli_args(prefix))
    }

    #[test]
    fn test_filesystem_args() {
        let wrapper = ConfigWrapper::new(FilesystemConfig::definition()).unwrap();
        let args = wrapper.cli_args(Some("source-"));
        let names: Vec<_> = args
            .iter()
            .filter_map(|a| a.get_long().map(str::to_string))
            .collect();
        assert!(names.contains(&"source-delete-older-than".to_string()));
        assert!(names.contains(&"source-excluded-paths".to_string()));

        let delete = args
            .iter()
            .find(|a| a.get_long() == Some("source-delete-older-than"))
            .unwrap();
        assert_eq!(
            delete.get_value_names().map(|v| v[0].to_string()),
            Some("delete-age".to_string())
        );
    }

    #[test]
    fn test_parse_filesystem_options() {
        let wrapper = ConfigWrapper::new(FilesystemConfig::definition()).unwrap();
        let matches = command(&wrapper, None)
            .try_get_matches_from([
                "--path",
                "/data",
                "--follow-links",
                "--delete-older-than",
                "86400",
                "--excluded-paths",
                ".*\\.tmp,.*\\.bak",
            ])
            .unwrap();

        let config = wrapper.parse_cli(&matches, None).unwrap();
        let config = config.downcast_ref::<FilesystemConfig>().unwrap();
        assert_eq!(config.path.as_deref(), Some("/data"));
        assert!(config.follow_links);
        assert!(!config.store_metadata);
        assert_eq!(config.delete_older_than, 86400);
        assert_eq!(config.excluded_paths, vec![".*\\.tmp", ".*\\.bak"]);
    }

    #[test]
    fn test_inverted_flag() {
        let wrapper = ConfigWrapper::new(EcsNamespaceCopyConfig::definition()).unwrap();
        let base = [
            "--target-bucket",
            "archive",
            "--source-namespace",
            "ns1",
        ];

        let matches = command(&wrapper, None).try_get_matches_from(base).unwrap();
        let config = wrapper.parse_cli(&matches, None).unwrap();
        assert!(config.downcast_ref::<EcsNamespaceCopyConfig>().unwrap().verify_target_bucket);

        let mut with_flag = base.to_vec();
        with_flag.push("--no-verify-target-bucket");
        let matches = command(&wrapper, None).try_get_matches_from(with_flag).unwrap();
        let config = wrapper.parse_cli(&matches, None).unwrap();
        assert!(!config.downcast_ref::<EcsNamespaceCopyConfig>().unwrap().verify_target_bucket);
    }

    #[test]
    fn test_cli_values_layer_over_uri() {
        let wrapper = ConfigWrapper::new(EcsNamespaceCopyConfig::definition()).unwrap();
        let matches = command(&wrapper, None)
            .try_get_matches_from(["--target-bucket", "archive", "--root-key", "x/"])
            .unwrap();

        let mut config = wrapper.from_uri("ecs-ns-copy:ak:sk@ecs.local:9020").unwrap();
        wrapper.apply_cli(config.as_mut(), &matches, None).unwrap();

        let config = config.downcast_ref::<EcsNamespaceCopyConfig>().unwrap();
        assert_eq!(config.root_key.as_deref(), Some("x/"));
        assert_eq!(config.target_bucket.as_deref(), Some("archive"));
        assert_eq!(config.host.as_deref(), Some("ecs.local"));
        assert_eq!(config.port, Some(9020));
        assert_eq!(config.access_key.as_deref(), Some("ak"));
        assert!(config.verify_target_bucket);
    }

    #[test]
    fn test_missing_required_option() {
        let wrapper = ConfigWrapper::new(GladinetMappingConfig::definition()).unwrap();
        let matches = command(&wrapper, Some("filter-"))
            .try_get_matches_from(Vec::<&str>::new())
            .unwrap();
        match wrapper.parse_cli(&matches, Some("filter-")) {
            Err(ConfigError::MissingRequired { key }) => {
                assert_eq!(key, "--filter-gladinet-dir");
            }
            other => panic!("expected MissingRequired, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_integer_is_invalid_value() {
        let wrapper = ConfigWrapper::new(FilesystemConfig::definition()).unwrap();
        let matches = command(&wrapper, None)
            .try_get_matches_from(["--delete-older-than", "later"])
            .unwrap();
        assert!(matches!(
            wrapper.parse_cli(&matches, None),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_matches_from_another_command() {
        let wrapper = ConfigWrapper::new(GladinetMappingConfig::definition()).unwrap();
        let matches = Command::new("other")
            .no_binary_name(true)
            .try_get_matches_from(Vec::<&str>::new())
            .unwrap();
        assert!(wrapper.parse_cli(&matches, None).is_err());
    }
}
