//! Interval document inspection

use crate::output::{
    color_level, color_message, format_duration, format_time, print_info, print_table, OutputFormat,
};
use anyhow::{Context, Result};
use std::path::Path;
use tabled::Tabled;
use timeline_lib::{serialization, summarize, Interval};

#[derive(Tabled)]
struct IntervalRow {
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Locator")]
    locator: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Duration")]
    duration: String,
}

impl From<&Interval> for IntervalRow {
    fn from(interval: &Interval) -> Self {
        Self {
            level: color_level(interval.level),
            locator: interval.locator.to_string(),
            message: color_message(interval),
            from: format_time(interval.from),
            to: format_time(interval.to),
            duration: format_duration(interval),
        }
    }
}

/// Show an interval document as a table or canonical JSON
pub fn show_intervals(input: &Path, format: OutputFormat) -> Result<()> {
    let intervals = serialization::read_intervals_file(input)
        .with_context(|| format!("Failed to read interval document {}", input.display()))?;

    match format {
        OutputFormat::Json => {
            let json = serialization::intervals_to_json(&intervals)?;
            println!("{}", String::from_utf8_lossy(&json));
        }
        OutputFormat::Table => {
            let rows: Vec<IntervalRow> = intervals.iter().map(IntervalRow::from).collect();
            print_table(&rows);

            if !intervals.is_empty() {
                let summary = summarize(&intervals);
                println!();
                print_info(&format!(
                    "{} intervals across {} locators ({} synthesized, {} zero-width)",
                    summary.intervals, summary.locators, summary.synthesized, summary.zero_width
                ));
            }
        }
    }

    Ok(())
}
