//! Error type shared by the parsing, validation and persistence paths
//!
//! Reconstruction itself has no failure mode once the window is valid;
//! every variant here is raised before any interval is produced.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid window: start {start} is after end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("unrecognized level {0:?}")]
    UnknownLevel(String),
    #[error("malformed locator {locator:?}: {reason}")]
    MalformedLocator { locator: String, reason: String },
    #[error("record for {locator} spans {from}..{to}, expected an instant")]
    NotAnInstant {
        locator: String,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    #[error("invalid interval document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TimelineError {
    pub(crate) fn malformed_locator(locator: &str, reason: impl Into<String>) -> Self {
        TimelineError::MalformedLocator {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }
}

pub type TimelineResult<T> = Result<T, TimelineError>;
