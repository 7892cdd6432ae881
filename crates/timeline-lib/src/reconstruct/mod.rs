//! Event-to-interval reconstruction
//!
//! This module turns unordered pod and container instants into ordered
//! intervals:
//! - Instants are grouped into pod families (a pod plus its containers)
//! - Each family is walked in canonical lifecycle order
//! - States whose observation is missing but implied are synthesized
//! - A family known from a single lifecycle instant yields one zero-width interval
//! - The combined result is sorted by [`crate::ordering::compare`]

mod family;
pub mod lifecycle;


use crate::error::{TimelineError, TimelineResult};
use crate::models::{Instant, Interval, Locator};
use crate::ordering;
use chrono::{DateTime, Utc};
use family::{rank_of, step_for, FamilyWalk};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Analysis window `[start, end)` over which lifecycles are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    /// Create a window, rejecting an inverted range
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> TimelineResult<Self> {
        if start > end {
            return Err(TimelineError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Clip a timestamp into the window
    pub fn clamp(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        at.clamp(self.start, self.end)
    }
}

/// Reconstruct intervals for every entity named by `instants`
///
/// # Errors
/// Returns [`TimelineError::InvalidWindow`] when `start > end`; nothing is
/// reconstructed in that case.
pub fn reconstruct(
    instants: &[Instant],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> TimelineResult<Vec<Interval>> {
    let window = Window::new(start, end)?;
    Ok(reconstruct_in(&window, instants))
}

/// Reconstruct over an already validated window. Total over any input.
pub fn reconstruct_in(window: &Window, instants: &[Instant]) -> Vec<Interval> {
    let mut families: BTreeMap<Locator, Vec<(usize, &Instant)>> = BTreeMap::new();
    for (index, instant) in instants.iter().enumerate() {
        families
            .entry(instant.locator.pod_locator())
            .or_default()
            .push((index, instant));
    }

    let mut intervals = Vec::with_capacity(instants.len());
    for (pod, mut members) in families {
        members.sort_by(|(ia, a), (ib, b)| {
            window
                .clamp(a.at)
                .cmp(&window.clamp(b.at))
                .then_with(|| rank_of(a).cmp(&rank_of(b)))
                .then_with(|| ia.cmp(ib))
        });

        let recognized = members.iter().filter(|(_, i)| step_for(i).is_some()).count();
        let mut walk = FamilyWalk::new(*window, recognized == 1);
        for (_, instant) in &members {
            walk.observe(instant);
        }
        let produced = walk.finish();

        debug!(
            pod = %pod,
            instants = members.len(),
            intervals = produced.len(),
            "Reconstructed pod family"
        );
        intervals.extend(produced);
    }

    ordering::order(intervals)
}

/// Counts describing a reconstructed interval set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconstructionSummary {
    pub intervals: usize,
    pub synthesized: usize,
    pub zero_width: usize,
    pub locators: usize,
}

/// Summarize an interval set
pub fn summarize(intervals: &[Interval]) -> ReconstructionSummary {
    let locators: HashSet<&str> = intervals.iter().map(|i| i.locator.as_str()).collect();
    ReconstructionSummary {
        intervals: intervals.len(),
        synthesized: intervals.iter().filter(|i| i.is_synthesized()).count(),
        zero_width: intervals.iter().filter(|i| i.is_instant()).count(),
        locators: locators.len(),
    }
}
