//! Output formatting utilities

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};
use timeline_lib::{Interval, Level};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of rows
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No intervals found".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message to stderr
///
/// Goes to stderr because stdout may carry an interval document.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a timestamp the way interval documents do
pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Format an interval length as a compact human-readable string
pub fn format_duration(interval: &Interval) -> String {
    let secs = interval.duration().num_seconds();
    if secs == 0 {
        return "-".to_string();
    }
    let (hours, rest) = (secs / 3600, secs % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Color a level by severity
pub fn color_level(level: Level) -> String {
    let text = level.as_str();
    match level {
        Level::Info => text.blue().to_string(),
        Level::Warning => text.yellow().to_string(),
        Level::Error => text.red().to_string(),
    }
}

/// Highlight messages of intervals that were inferred rather than observed
pub fn color_message(interval: &Interval) -> String {
    if interval.is_synthesized() {
        interval.message.as_str().yellow().italic().to_string()
    } else {
        interval.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use timeline_lib::Locator;

    fn interval(secs: i64) -> Interval {
        let from = Utc.with_ymd_and_hms(2022, 3, 7, 18, 0, 0).unwrap();
        Interval {
            level: Level::Info,
            locator: Locator::pod("ns", "p", "u"),
            message: "constructed/true reason/Scheduled node/n1".to_string(),
            from,
            to: from + chrono::Duration::seconds(secs),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(&interval(0)), "-");
        assert_eq!(format_duration(&interval(42)), "42s");
        assert_eq!(format_duration(&interval(125)), "2m5s");
        assert_eq!(format_duration(&interval(3725)), "1h2m5s");
    }

    #[test]
    fn test_format_time() {
        let at = Utc.with_ymd_and_hms(2022, 3, 7, 18, 41, 4).unwrap();
        assert_eq!(format_time(at), "2022-03-07T18:41:04Z");
    }

    #[test]
    fn test_color_message_keeps_text() {
        let observed = interval(5);
        assert_eq!(color_message(&observed), observed.message);
    }
}
