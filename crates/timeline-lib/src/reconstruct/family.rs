//! Lifecycle walk over the instants of one pod and its containers

use super::lifecycle::{self, Ends, Scope, Step, StepKind, Trailing, PASS_THROUGH_RANK};
use super::Window;
use crate::models::{Instant, Interval, Level, Locator, CONSTRUCTED_MARKER, MISSED_REAL_MARKER};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// The lifecycle step an instant represents, if its reason is recognized
/// and applies to the kind of entity its locator names
pub(super) fn step_for(instant: &Instant) -> Option<&'static Step> {
    let step = lifecycle::step(instant.reason.as_deref()?)?;
    let applies = match step.scope {
        Scope::Pod => !instant.locator.is_container(),
        Scope::Container => instant.locator.is_container(),
    };
    applies.then_some(step)
}

/// Canonical causal rank of an instant among others sharing its timestamp
pub(super) fn rank_of(instant: &Instant) -> u8 {
    step_for(instant).map(|s| s.rank).unwrap_or(PASS_THROUGH_RANK)
}

/// A state entered by an observed instant and not yet ended
#[derive(Debug)]
struct OpenState {
    reason: &'static str,
    level: Level,
    locator: Locator,
    detail: String,
    from: DateTime<Utc>,
    trailing: Trailing,
}

impl OpenState {
    fn close(self, to: DateTime<Utc>) -> Interval {
        observed(self.level, self.locator, self.reason, &self.detail, self.from, to)
    }
}

/// Walks one pod family's instants in canonical order
///
/// Instants must be fed through [`FamilyWalk::observe`] sorted by clamped
/// time and rank.
pub(super) struct FamilyWalk {
    window: Window,
    /// The family holds a single lifecycle observation and nothing else
    isolated: bool,
    /// Keyed by locator then rank so that bulk closes follow lifecycle order
    open: BTreeMap<(Locator, u8), OpenState>,
    last_seen: HashMap<Locator, DateTime<Utc>>,
    out: Vec<Interval>,
}

impl FamilyWalk {
    pub(super) fn new(window: Window, isolated: bool) -> Self {
        Self {
            window,
            isolated,
            open: BTreeMap::new(),
            last_seen: HashMap::new(),
            out: Vec::new(),
        }
    }

    pub(super) fn observe(&mut self, instant: &Instant) {
        let at = self.window.clamp(instant.at);
        let Some(step) = step_for(instant) else {
            trace!(
                locator = %instant.locator,
                message = %instant.message,
                "Passing through unrecognized instant"
            );
            self.out.push(Interval {
                level: instant.level,
                locator: instant.locator.clone(),
                message: instant.message.clone(),
                from: at,
                to: at,
            });
            return;
        };

        if self.isolated && step.kind != StepKind::Terminal {
            // A lone observation is a point fact with nothing to infer from
            self.out.push(observed(
                instant.level,
                instant.locator.clone(),
                step.reason,
                &instant.detail,
                at,
                at,
            ));
            return;
        }

        if self.is_open(&instant.locator, step) {
            // Re-observing a state already entered keeps the earlier left edge.
            trace!(
                locator = %instant.locator,
                reason = step.reason,
                "Absorbing repeated observation"
            );
            self.last_seen.insert(instant.locator.clone(), at);
            return;
        }

        for ended in step.ends {
            self.end_state(instant, ended, at);
        }

        match step.kind {
            StepKind::State(trailing) => self.open_state(instant, step, trailing, at),
            StepKind::Point => self.out.push(observed(
                instant.level,
                instant.locator.clone(),
                step.reason,
                &instant.detail,
                at,
                at,
            )),
            StepKind::Terminal => self.close_all(at),
        }

        self.last_seen.insert(instant.locator.clone(), at);
    }

    /// Close whatever is still open when observation stops
    pub(super) fn finish(mut self) -> Vec<Interval> {
        let end = self.window.end();
        for (_, state) in std::mem::take(&mut self.open) {
            let to = match state.trailing {
                Trailing::ClipToEnd => end,
                Trailing::ZeroWidth => state.from,
            };
            self.out.push(state.close(to));
        }
        self.out
    }

    fn end_state(&mut self, instant: &Instant, ended: &Ends, at: DateTime<Utc>) {
        let key = (instant.locator.clone(), lifecycle::rank(ended.reason));
        match self.open.remove(&key) {
            Some(state) => self.out.push(state.close(at)),
            None if ended.required => {
                let from = self.inferred_start(instant, at);
                trace!(
                    locator = %instant.locator,
                    reason = ended.reason,
                    from = %from,
                    to = %at,
                    "Synthesizing missed observation"
                );
                self.out.push(synthesized(instant.locator.clone(), ended.reason, from, at));
            }
            None => {}
        }
    }

    fn open_state(
        &mut self,
        instant: &Instant,
        step: &'static Step,
        trailing: Trailing,
        at: DateTime<Utc>,
    ) {
        let state = OpenState {
            reason: step.reason,
            level: instant.level,
            locator: instant.locator.clone(),
            detail: instant.detail.clone(),
            from: at,
            trailing,
        };
        self.open.insert((instant.locator.clone(), step.rank), state);
    }

    fn is_open(&self, locator: &Locator, step: &Step) -> bool {
        matches!(step.kind, StepKind::State(_))
            && self.open.contains_key(&(locator.clone(), step.rank))
    }

    fn close_all(&mut self, at: DateTime<Utc>) {
        for (_, state) in std::mem::take(&mut self.open) {
            self.out.push(state.close(at));
        }
    }

    /// Left edge for a state whose own observation is missing
    ///
    /// A measured duration on the closing instant wins over clock-derived
    /// anchors, but never reaches back past the last time the entity itself
    /// was seen. Without one, the state is assumed to begin at the last time
    /// anything was known about the entity, then about its pod, and finally
    /// collapses to a zero-width fact at the closing instant.
    fn inferred_start(&self, instant: &Instant, at: DateTime<Utc>) -> DateTime<Utc> {
        let seen = self.last_seen.get(&instant.locator).map(|seen| (*seen).min(at));
        if let Some(measured) = instant.measured_duration() {
            let from = at.checked_sub_signed(measured).unwrap_or(self.window.start());
            let from = seen.map_or(from, |seen| from.max(seen));
            return self.window.clamp(from);
        }
        seen.or_else(|| {
            self.last_seen
                .get(&instant.locator.pod_locator())
                .map(|seen| (*seen).min(at))
        })
        .unwrap_or(at)
    }
}

fn observed(
    level: Level,
    locator: Locator,
    reason: &str,
    detail: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Interval {
    Interval {
        level,
        locator,
        message: format!("{} reason/{} {}", CONSTRUCTED_MARKER, reason, detail),
        from,
        to,
    }
}

fn synthesized(locator: Locator, reason: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Interval {
    Interval {
        level: Level::Info,
        locator,
        message: format!(
            "{} reason/{} {} {:?}",
            CONSTRUCTED_MARKER, reason, MISSED_REAL_MARKER, reason
        ),
        from,
        to,
    }
}
