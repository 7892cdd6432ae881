//! Canonical JSON form for instants and intervals
//!
//! A document is a single object with an `items` array. Writing always
//! applies the canonical ordering and a 4-space pretty printer so that
//! output can be compared byte-for-byte against recorded fixtures.

use crate::error::{TimelineError, TimelineResult};
use crate::models::{Instant, Interval};
use crate::ordering;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

const INDENT: &[u8] = b"    ";

/// One element of the `items` array, in wire field order
#[derive(Debug, Serialize, Deserialize)]
struct IntervalRecord {
    level: String,
    locator: String,
    message: String,
    #[serde(with = "rfc3339_seconds")]
    from: chrono::DateTime<chrono::Utc>,
    #[serde(with = "rfc3339_seconds")]
    to: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IntervalDocument {
    #[serde(default)]
    items: Vec<IntervalRecord>,
}

impl From<&Interval> for IntervalRecord {
    fn from(interval: &Interval) -> Self {
        Self {
            level: interval.level.to_string(),
            locator: interval.locator.to_string(),
            message: interval.message.clone(),
            from: interval.from,
            to: interval.to,
        }
    }
}

impl TryFrom<IntervalRecord> for Interval {
    type Error = TimelineError;

    fn try_from(record: IntervalRecord) -> Result<Self, Self::Error> {
        Ok(Interval {
            level: record.level.parse()?,
            locator: record.locator.parse()?,
            message: record.message,
            from: record.from,
            to: record.to,
        })
    }
}

/// RFC3339 at second precision with a `Z` suffix
mod rfc3339_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {:?}: {}", raw, e)))
    }
}

fn write_document<'a>(intervals: impl Iterator<Item = &'a Interval>) -> TimelineResult<Vec<u8>> {
    let mut sorted: Vec<&Interval> = intervals.collect();
    sorted.sort_by(|a, b| ordering::compare(a, b));

    let document = IntervalDocument {
        items: sorted.into_iter().map(IntervalRecord::from).collect(),
    };

    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    document.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Serialize intervals into the canonical document
pub fn intervals_to_json(intervals: &[Interval]) -> TimelineResult<Vec<u8>> {
    write_document(intervals.iter())
}

/// Serialize only intervals with a non-zero width
pub fn spans_to_json(intervals: &[Interval]) -> TimelineResult<Vec<u8>> {
    write_document(intervals.iter().filter(|i| !i.is_instant()))
}

/// Parse a canonical document into intervals, preserving array order
pub fn intervals_from_json(data: &[u8]) -> TimelineResult<Vec<Interval>> {
    let document: IntervalDocument = serde_json::from_slice(data)?;
    document.items.into_iter().map(Interval::try_from).collect()
}

/// Parse a canonical document whose items are all instants
pub fn instants_from_json(data: &[u8]) -> TimelineResult<Vec<Instant>> {
    intervals_from_json(data)?
        .into_iter()
        .map(Instant::from_interval)
        .collect()
}

fn write_file(path: &Path, bytes: &[u8]) -> TimelineResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(bytes)?;
    writer.flush()?;
    debug!(path = %path.display(), bytes = bytes.len(), "Wrote interval document");
    Ok(())
}

fn read_file(path: &Path) -> TimelineResult<Vec<u8>> {
    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;
    debug!(path = %path.display(), bytes = data.len(), "Read interval document");
    Ok(data)
}

pub fn write_intervals_file(path: impl AsRef<Path>, intervals: &[Interval]) -> TimelineResult<()> {
    write_file(path.as_ref(), &intervals_to_json(intervals)?)
}

pub fn write_spans_file(path: impl AsRef<Path>, intervals: &[Interval]) -> TimelineResult<()> {
    write_file(path.as_ref(), &spans_to_json(intervals)?)
}

pub fn read_intervals_file(path: impl AsRef<Path>) -> TimelineResult<Vec<Interval>> {
    intervals_from_json(&read_file(path.as_ref())?)
}

pub fn read_instants_file(path: impl AsRef<Path>) -> TimelineResult<Vec<Instant>> {
    instants_from_json(&read_file(path.as_ref())?)
}
