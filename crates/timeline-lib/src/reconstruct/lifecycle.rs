//! Canonical pod and container lifecycle
//!
//! Every recognized reason maps to one [`Step`] in a static table. The
//! engine consults the table only; no reason-specific logic lives in the
//! walk itself.

/// Which half of a pod family a step applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Pod,
    Container,
}

/// Set of mutually exclusive states an entity is in at any moment
///
/// A container is always in one runtime state and, independently, one
/// readiness state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Placement,
    Runtime,
    Readiness,
}

/// How a state still open when observation stops is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trailing {
    /// Close at the window end: the entity was still in this state
    ClipToEnd,
    /// Close at the state's own start: a change was noted but never followed up
    ZeroWidth,
}

/// What an observation of a step does besides ending earlier states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Opens a state named after the step
    State(Trailing),
    /// Emitted as a zero-width fact
    Point,
    /// Ends every open state of the pod and its containers, emits nothing
    Terminal,
}

/// A state ended by a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ends {
    pub reason: &'static str,
    /// The step proves this state happened, so a missing observation is
    /// synthesized
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub reason: &'static str,
    pub scope: Scope,
    pub track: Track,
    /// Causal order among observations sharing a timestamp
    pub rank: u8,
    pub ends: &'static [Ends],
    pub kind: StepKind,
}

/// Rank given to reasons outside the table
pub const PASS_THROUGH_RANK: u8 = 254;

const fn ends(reason: &'static str) -> Ends {
    Ends {
        reason,
        required: false,
    }
}

const fn requires(reason: &'static str) -> Ends {
    Ends {
        reason,
        required: true,
    }
}

pub const CREATED: &str = "Created";
pub const SCHEDULED: &str = "Scheduled";
pub const DELETED: &str = "Deleted";
pub const CONTAINER_WAIT: &str = "ContainerWait";
pub const CONTAINER_START: &str = "ContainerStart";
pub const CONTAINER_EXIT: &str = "ContainerExit";
pub const NOT_READY: &str = "NotReady";
pub const READY: &str = "Ready";

static STEPS: &[Step] = &[
    Step {
        reason: CREATED,
        scope: Scope::Pod,
        track: Track::Placement,
        rank: 0,
        ends: &[],
        kind: StepKind::State(Trailing::ZeroWidth),
    },
    Step {
        reason: SCHEDULED,
        scope: Scope::Pod,
        track: Track::Placement,
        rank: 1,
        ends: &[ends(CREATED)],
        kind: StepKind::State(Trailing::ClipToEnd),
    },
    Step {
        reason: CONTAINER_WAIT,
        scope: Scope::Container,
        track: Track::Runtime,
        rank: 2,
        ends: &[ends(CONTAINER_START), ends(READY), ends(NOT_READY)],
        kind: StepKind::State(Trailing::ClipToEnd),
    },
    Step {
        reason: CONTAINER_START,
        scope: Scope::Container,
        track: Track::Runtime,
        rank: 3,
        ends: &[requires(CONTAINER_WAIT)],
        kind: StepKind::State(Trailing::ClipToEnd),
    },
    Step {
        reason: NOT_READY,
        scope: Scope::Container,
        track: Track::Readiness,
        rank: 4,
        ends: &[ends(READY)],
        kind: StepKind::State(Trailing::ZeroWidth),
    },
    Step {
        reason: READY,
        scope: Scope::Container,
        track: Track::Readiness,
        rank: 5,
        ends: &[requires(NOT_READY)],
        kind: StepKind::State(Trailing::ClipToEnd),
    },
    Step {
        reason: CONTAINER_EXIT,
        scope: Scope::Container,
        track: Track::Runtime,
        rank: 6,
        ends: &[
            ends(CONTAINER_WAIT),
            ends(CONTAINER_START),
            ends(READY),
            ends(NOT_READY),
        ],
        kind: StepKind::Point,
    },
    Step {
        reason: DELETED,
        scope: Scope::Pod,
        track: Track::Placement,
        rank: 255,
        ends: &[],
        kind: StepKind::Terminal,
    },
];

/// Look up the step for a reason
pub fn step(reason: &str) -> Option<&'static Step> {
    STEPS.iter().find(|s| s.reason == reason)
}

/// All recognized steps in canonical order
pub fn steps() -> &'static [Step] {
    STEPS
}

/// Rank of a reason; pass-through reasons sort after the lifecycle but
/// before a terminal step
pub fn rank(reason: &str) -> u8 {
    step(reason).map(|s| s.rank).unwrap_or(PASS_THROUGH_RANK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_are_unique_and_ascending() {
        let ranks: Vec<u8> = steps().iter().map(|s| s.rank).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn test_ended_states_are_known_states() {
        for s in steps() {
            for e in s.ends {
                let target = step(e.reason).expect("ended reason is in the table");
                assert!(matches!(target.kind, StepKind::State(_)), "{} is not a state", e.reason);
                assert_eq!(target.scope, s.scope, "{} ends a state in another scope", s.reason);
            }
        }
    }

    #[test]
    fn test_terminal_ranks_last() {
        let deleted = step(DELETED).unwrap();
        assert_eq!(deleted.kind, StepKind::Terminal);
        assert!(steps().iter().all(|s| s.rank <= deleted.rank));
        assert!(rank("Evicted") < deleted.rank);
        assert_eq!(rank("Evicted"), PASS_THROUGH_RANK);
        assert_eq!(rank(READY), 5);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(step(READY).map(|s| s.scope), Some(Scope::Container));
        assert_eq!(step(SCHEDULED).map(|s| s.scope), Some(Scope::Pod));
        assert!(step("ready").is_none());
        assert!(step(CONTAINER_START).unwrap().ends[0].required);
    }

    #[test]
    fn test_waiting_ends_a_running_container() {
        let wait = step(CONTAINER_WAIT).unwrap();
        for reason in [CONTAINER_START, READY, NOT_READY] {
            let ended = wait.ends.iter().find(|e| e.reason == reason);
            assert_eq!(ended.map(|e| e.required), Some(false), "{}", reason);
        }
    }
}
