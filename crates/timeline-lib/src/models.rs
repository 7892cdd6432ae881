//! Core data models: levels, locators, instants and intervals

use crate::error::{TimelineError, TimelineResult};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Prefix token on every message produced by reconstruction
pub const CONSTRUCTED_MARKER: &str = "constructed/true";

/// Marks an interval whose justifying instant was absent from the input
pub const MISSED_REAL_MARKER: &str = "missed real";

/// Severity of an instant or interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    /// Wire form, case-sensitive
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "Info",
            Level::Warning => "Warning",
            Level::Error => "Error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Info" => Ok(Level::Info),
            "Warning" => Ok(Level::Warning),
            "Error" => Ok(Level::Error),
            other => Err(TimelineError::UnknownLevel(other.to_string())),
        }
    }
}

/// Structured identity of a pod or one of its containers
///
/// The flattened form `ns/<ns> pod/<name> uid/<uid>[ container/<name>]` is
/// computed once at construction and is what ordering compares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    namespace: String,
    pod: String,
    uid: String,
    container: Option<String>,
    flat: String,
}

impl Locator {
    /// Locator for a pod
    pub fn pod(namespace: impl Into<String>, pod: impl Into<String>, uid: impl Into<String>) -> Self {
        Self::build(namespace.into(), pod.into(), uid.into(), None)
    }

    /// Locator for a container within a pod
    pub fn container(
        namespace: impl Into<String>,
        pod: impl Into<String>,
        uid: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::build(namespace.into(), pod.into(), uid.into(), Some(container.into()))
    }

    fn build(namespace: String, pod: String, uid: String, container: Option<String>) -> Self {
        let mut flat = format!("ns/{} pod/{} uid/{}", namespace, pod, uid);
        if let Some(name) = &container {
            flat.push_str(" container/");
            flat.push_str(name);
        }
        Self {
            namespace,
            pod,
            uid,
            container,
            flat,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn pod_name(&self) -> &str {
        &self.pod
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn container_name(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    /// The owning pod's locator (itself for pod locators)
    pub fn pod_locator(&self) -> Locator {
        if self.container.is_none() {
            return self.clone();
        }
        Self::build(self.namespace.clone(), self.pod.clone(), self.uid.clone(), None)
    }

    /// Canonical flattened form
    pub fn as_str(&self) -> &str {
        &self.flat
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flat)
    }
}

impl Ord for Locator {
    fn cmp(&self, other: &Self) -> Ordering {
        self.flat.cmp(&other.flat)
    }
}

impl PartialOrd for Locator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Locator {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut namespace = None;
        let mut pod = None;
        let mut uid = None;
        let mut container = None;

        for token in s.split(' ') {
            let (key, value) = token
                .split_once('/')
                .ok_or_else(|| TimelineError::malformed_locator(s, format!("token {:?} has no key", token)))?;
            let slot = match key {
                "ns" => &mut namespace,
                "pod" => &mut pod,
                "uid" => &mut uid,
                "container" => &mut container,
                other => {
                    return Err(TimelineError::malformed_locator(
                        s,
                        format!("unknown key {:?}", other),
                    ))
                }
            };
            if slot.replace(value.to_string()).is_some() {
                return Err(TimelineError::malformed_locator(s, format!("duplicate key {:?}", key)));
            }
        }

        let namespace = namespace.ok_or_else(|| TimelineError::malformed_locator(s, "missing ns"))?;
        let pod = pod.ok_or_else(|| TimelineError::malformed_locator(s, "missing pod"))?;
        let uid = uid.ok_or_else(|| TimelineError::malformed_locator(s, "missing uid"))?;

        let locator = Self::build(namespace, pod, uid, container);
        // Flattening must be an exact inverse, so token order is part of the format.
        if locator.flat != s {
            return Err(TimelineError::malformed_locator(s, "tokens are not in canonical order"));
        }
        Ok(locator)
    }
}

/// A time-ranged fact produced by reconstruction, or a raw record read from
/// the canonical document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub level: Level,
    pub locator: Locator,
    pub message: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Interval {
    /// Zero-width interval
    pub fn is_instant(&self) -> bool {
        self.from == self.to
    }

    /// True when the interval was inferred rather than directly observed
    pub fn is_synthesized(&self) -> bool {
        self.message.contains(MISSED_REAL_MARKER)
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }

    /// The lifecycle reason named by the message, if any
    pub fn reason(&self) -> Option<&str> {
        self.message
            .split_whitespace()
            .find_map(|token| token.strip_prefix("reason/"))
            .filter(|r| !r.is_empty())
    }
}

/// A point-in-time observation about a pod or container
///
/// The message is split once at construction: the `reason/<R>` token becomes
/// `reason`, every other token (minus any `constructed/` marker) is kept in
/// order as `detail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instant {
    pub level: Level,
    pub locator: Locator,
    pub message: String,
    pub reason: Option<String>,
    pub detail: String,
    pub at: DateTime<Utc>,
}

impl Instant {
    pub fn new(level: Level, locator: Locator, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        let message = message.into();
        let (reason, detail) = split_message(&message);
        Self {
            level,
            locator,
            message,
            reason,
            detail,
            at,
        }
    }

    /// Convert a zero-width record into an instant
    pub fn from_interval(interval: Interval) -> TimelineResult<Self> {
        if interval.from != interval.to {
            return Err(TimelineError::NotAnInstant {
                locator: interval.locator.to_string(),
                from: interval.from,
                to: interval.to,
            });
        }
        Ok(Self::new(interval.level, interval.locator, interval.message, interval.from))
    }

    /// Value of a `key/value` detail token
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.detail.split(' ').find_map(|token| {
            token
                .split_once('/')
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v)
        })
    }

    /// Internally measured elapsed time carried by a `duration/` annotation
    pub fn measured_duration(&self) -> Option<Duration> {
        self.annotation("duration").and_then(parse_duration)
    }
}

fn split_message(message: &str) -> (Option<String>, String) {
    let mut reason = None;
    let mut rest = Vec::new();
    for token in message.split_whitespace() {
        if token.starts_with("constructed/") {
            continue;
        }
        match token.strip_prefix("reason/") {
            Some(r) if reason.is_none() && !r.is_empty() => reason = Some(r.to_string()),
            _ => rest.push(token),
        }
    }
    (reason, rest.join(" "))
}

/// Parse `6.00s` or `250ms`
fn parse_duration(value: &str) -> Option<Duration> {
    let millis = if let Some(ms) = value.strip_suffix("ms") {
        ms.parse::<f64>().ok()?
    } else {
        value.strip_suffix('s')?.parse::<f64>().ok()? * 1000.0
    };
    if !millis.is_finite() || millis < 0.0 {
        return None;
    }
    Some(Duration::milliseconds(millis.round() as i64))
}
