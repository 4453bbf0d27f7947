//! FerroSync - plugin based storage synchronization
//!
//! Command line front end for the plugin registry: lists the built-in storage
//! and filter plugins, resolves storage URIs, synthesizes and parses plugin
//! options, lists filesystem sources and shows the run settings.

mod display;

use anyhow::{anyhow, Context, Result};
use clap::{Command, Parser, Subcommand};
use console::style;
use ferrosync_config::{
    Capability, ConfigRegistry, FilesystemConfig, LoggingSettings, SettingsLoader, SyncSettings,
};
use ferrosync_model::FilesystemSource;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// FerroSync - plugin based storage synchronization
#[derive(Parser)]
#[command(
    name = "ferrosync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Plugin based storage synchronization",
    long_about = "FerroSync copies objects between storage systems through pluggable\n\
                  sources, targets and filters. Storage plugins are addressed by URI,\n\
                  every plugin option is available on the command line."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Settings file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available plugins and their options
    Plugins {
        /// Only storage plugins
        #[arg(long, conflicts_with = "filters")]
        storage: bool,
        /// Only filter plugins
        #[arg(long)]
        filters: bool,
    },
    /// Resolve a storage URI and show the resulting configuration
    Describe {
        /// Storage URI, e.g. file:///var/data
        uri: String,
    },
    /// Parse plugin options and show the resulting configuration
    Options {
        /// Storage URI or prefix (e.g. ecs-ns-copy:) or filter name
        plugin: String,
        /// Prefix of every option name
        #[arg(long)]
        prefix: Option<String>,
        /// Plugin options
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List the objects of a filesystem source
    List {
        /// Filesystem URI, e.g. file:///var/data
        uri: String,
        /// Plugin options
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show run settings
    Settings {
        /// Show default settings
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref());
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    init_logging(cli.debug, cli.quiet, cli.verbose, &logging)?;
    let settings = settings?;

    info!("FerroSync v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = ConfigRegistry::with_builtin_plugins();
    match cli.command {
        Commands::Plugins { storage, filters } => {
            plugins_command(&registry, storage, filters, cli.verbose);
        }
        Commands::Describe { uri } => describe_command(&registry, &uri)?,
        Commands::Options {
            plugin,
            prefix,
            args,
        } => options_command(&registry, &plugin, prefix.as_deref(), args)?,
        Commands::List { uri, args } => list_command(&registry, &uri, args, &settings).await?,
        Commands::Settings { default } => settings_command(default, &settings)?,
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<SyncSettings> {
    match path {
        Some(path) => SettingsLoader::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => SettingsLoader::load_default().context("Failed to load settings"),
    }
}

fn init_logging(debug: bool, quiet: bool, verbose: bool, logging: &LoggingSettings) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let result = if logging.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

fn plugins_command(registry: &ConfigRegistry, storage: bool, filters: bool, verbose: bool) {
    let capabilities: &[Capability] = match (storage, filters) {
        (true, _) => &[Capability::Storage],
        (_, true) => &[Capability::Filter],
        _ => &[Capability::Storage, Capability::Filter],
    };

    for capability in capabilities {
        println!(
            "{} {} plugins",
            style("▸").green().bold(),
            style(capability).bold()
        );
        for wrapper in registry.all_wrappers(*capability) {
            display::print_wrapper(&wrapper, verbose);
        }
        println!();
    }
}

fn describe_command(registry: &ConfigRegistry, uri: &str) -> Result<()> {
    let (wrapper, config) = registry.storage_config_from_uri(uri)?;
    display::print_summary(wrapper.label(), &wrapper.summarize(config.as_ref())?);
    println!(
        "  {} {}",
        style("uri:").dim(),
        style(wrapper.generate_uri(config.as_ref())?).cyan()
    );
    Ok(())
}

fn options_command(
    registry: &ConfigRegistry,
    plugin: &str,
    prefix: Option<&str>,
    args: Vec<String>,
) -> Result<()> {
    let wrapper = if plugin.contains(':') {
        registry.storage_wrapper_for(plugin)?
    } else {
        registry.filter_wrapper_for(plugin)?
    };

    let command = Command::new(format!("ferrosync options {}", plugin))
        .no_binary_name(true)
        .args(wrapper.cli_args(prefix));
    let matches = match command.try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(e) if !e.use_stderr() => {
            e.print()?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // explicit flags win over URI components
    let mut config = if wrapper.uri_prefix().is_some_and(|p| p != plugin) {
        wrapper.from_uri(plugin)?
    } else {
        wrapper.create()
    };
    wrapper.apply_cli(config.as_mut(), &matches, prefix)?;

    display::print_summary(wrapper.label(), &wrapper.summarize(config.as_ref())?);
    Ok(())
}

async fn list_command(
    registry: &ConfigRegistry,
    uri: &str,
    args: Vec<String>,
    settings: &SyncSettings,
) -> Result<()> {
    let wrapper = registry.wrapper_for_type::<FilesystemConfig>()?;
    let command = Command::new("ferrosync list")
        .no_binary_name(true)
        .args(wrapper.cli_args(None));
    let matches = command.try_get_matches_from(args)?;

    let mut config = wrapper.from_uri(uri)?;
    wrapper.apply_cli(config.as_mut(), &matches, None)?;
    let config = config
        .downcast_ref::<FilesystemConfig>()
        .context("filesystem plugin produced a foreign configuration")?;

    let source = FilesystemSource::new(config, settings.performance.buffer_size)?;
    let (mut objects, mut bytes, mut failed) = (0u64, 0u64, 0u64);
    for object in source.objects() {
        let mut object = match object {
            Ok(object) => object,
            Err(e) => {
                warn!("{}", e);
                failed += 1;
                continue;
            }
        };
        let (size, modified) = match object.metadata().await {
            Ok(metadata) => (metadata.content_length, metadata.modification_time),
            Err(e) => {
                warn!("{}", e);
                failed += 1;
                continue;
            }
        };
        objects += 1;
        bytes += size;
        display::print_object(object.relative_path(), object.is_directory(), size, modified);
    }

    display::print_listing_totals(objects, bytes, failed);
    Ok(())
}

fn settings_command(default: bool, settings: &SyncSettings) -> Result<()> {
    if default {
        println!("{} Default settings:", style("⚙").blue().bold());
        print!("{}", SettingsLoader::to_yaml(&SyncSettings::default())?);
    } else {
        match SettingsLoader::settings_exists() {
            Some(path) => println!(
                "{} Current settings ({}):",
                style("⚙").blue().bold(),
                path.display()
            ),
            None => println!("{} Current settings (defaults):", style("⚙").blue().bold()),
        }
        print!("{}", SettingsLoader::to_yaml(settings)?);
    }
    Ok(())
}
