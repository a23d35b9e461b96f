//! Output helpers shared by all commands.
//!
//! Text messages go to stdout with a colored marker; JSON results are
//! pretty-printed so they can be piped into other tools.

use colored::Colorize;
use serde::Serialize;

use crate::OutputFormat;

/// Print a command result. Text format falls back to compact JSON.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value),
        OutputFormat::Text => serde_json::to_string(value),
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("{}: failed to serialize output: {}", "Error".red().bold(), e),
    }
}

/// Print a success message in text mode.
pub fn success(message: &str, format: OutputFormat, quiet: bool) {
    if quiet || matches!(format, OutputFormat::Json) {
        return;
    }
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a progress message in text mode.
pub fn info(message: &str, format: OutputFormat, quiet: bool) {
    if quiet || matches!(format, OutputFormat::Json) {
        return;
    }
    println!("{} {}", "→".blue(), message);
}

/// Print a warning in text mode. Goes to stderr so JSON stays parseable.
pub fn warning(message: &str, format: OutputFormat, quiet: bool) {
    if quiet || matches!(format, OutputFormat::Json) {
        return;
    }
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}
