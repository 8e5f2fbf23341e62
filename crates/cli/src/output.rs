//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use predict_lib::{Confidence, ServiceStatus};
use serde::Serialize;
use std::str::FromStr;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return Ok(());
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => print_json(&items)?,
    }
    Ok(())
}

/// Pretty-print any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a section heading with an underline
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Color service status
pub fn color_status(status: &ServiceStatus) -> String {
    let text = status.to_string();
    match status {
        ServiceStatus::Healthy => text.green().to_string(),
        ServiceStatus::Degraded => text.yellow().to_string(),
        ServiceStatus::Other(_) => text.red().to_string(),
    }
}

/// Malignant in red, anything else in green
pub fn color_label(label: &str, malignant: bool) -> String {
    if malignant {
        label.red().bold().to_string()
    } else {
        label.green().bold().to_string()
    }
}

/// Confidence badge
pub fn color_confidence(confidence: &Confidence) -> String {
    let text = confidence.to_string();
    match confidence {
        Confidence::High => text.green().to_string(),
        Confidence::Medium => text.yellow().to_string(),
        Confidence::Low => text.red().to_string(),
        Confidence::Other(_) => text,
    }
}

/// Yes/no with color
pub fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

/// Format a UTC timestamp for display
pub fn format_timestamp(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
