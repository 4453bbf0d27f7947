//! Terminal output for the FerroSync CLI

use chrono::{DateTime, Utc};
use console::style;
use ferrosync_config::{Capability, ConfigWrapper, OptionDescriptor};

/// Print a plugin with its command-line options
pub fn print_wrapper(wrapper: &ConfigWrapper, verbose: bool) {
    let addressing = match wrapper.capability() {
        Capability::Storage => format!("URI prefix {}", wrapper.uri_prefix().unwrap_or_default()),
        Capability::Filter => format!("filter {}", wrapper.cli_name().unwrap_or_default()),
    };

    println!();
    println!(
        "{} {}",
        style(wrapper.label()).bold().underlined(),
        style(format!("({}, {})", wrapper.type_name(), addressing)).dim()
    );
    if verbose {
        println!("  {}", wrapper.documentation());
    }
    for option in wrapper.cli_options() {
        println!("  {}", option_usage(option));
        println!("      {}", style(option.description).dim());
    }
}

/// Usage line of one option, e.g. `--delete-older-than <delete-age>`
pub fn option_usage(option: &OptionDescriptor) -> String {
    let mut usage = format!("--{}", option.cli_name);
    if !option.is_flag() {
        usage.push_str(&format!(" <{}>", option.value_hint));
    }
    if option.required {
        usage.push_str(" [required]");
    }
    usage
}

/// Print a configuration summary
pub fn print_summary(title: &str, summary: &str) {
    println!("{} {}", style("⚙").blue().bold(), style(title).bold());
    if summary.is_empty() {
        println!("  {}", style("(no options set)").dim());
    }
    for line in summary.lines() {
        match line.split_once('=') {
            Some((property, value)) => println!("  {} = {}", style(property).cyan(), value),
            None => println!("  {}", line),
        }
    }
}

/// Print one listed object
pub fn print_object(
    relative_path: &str,
    is_directory: bool,
    size: u64,
    modified: Option<DateTime<Utc>>,
) {
    let modified = modified
        .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    if is_directory {
        println!("{:>10}  {}  {}/", "-", modified, style(relative_path).blue());
    } else {
        println!("{:>10}  {}  {}", format_bytes(size), modified, relative_path);
    }
}

/// Print listing totals
pub fn print_listing_totals(objects: u64, bytes: u64, failed: u64) {
    println!();
    println!(
        "{} objects, {} total, {} failed",
        style(objects).bold(),
        style(format_bytes(bytes)).green(),
        if failed > 0 {
            style(failed).red()
        } else {
            style(failed).green()
        }
    );
}

/// Human readable byte count
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
