//! Known-noisy locator exclusions
//!
//! Some containers are known to restart repeatedly and are accepted as
//! such. The filter decides whether a diagnostic about a locator should be
//! suppressed; it holds no state beyond its compiled patterns.

use regex::Regex;
use tracing::warn;

/// Containers known to restart more often than the diagnostic threshold
pub const KNOWN_RESTART_EXCLUSIONS: &[&str] = &[
    "container/metal3-static-ip-set",
    "container/ingress-operator",
    "container/networking-console-plugin",
];

/// Restarts tolerated before a container is worth reporting
pub const RESTART_THRESHOLD: usize = 3;

#[derive(Debug, Clone)]
struct Pattern {
    source: String,
    /// `None` when the source failed to compile
    compiled: Option<Regex>,
}

/// Immutable set of exclusion patterns, compiled once
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    patterns: Vec<Pattern>,
}

impl ExclusionFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns
            .into_iter()
            .map(|source| {
                let source = source.into();
                let compiled = match Regex::new(&source) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(pattern = %source, error = %e, "Invalid exclusion pattern");
                        None
                    }
                };
                Pattern { source, compiled }
            })
            .collect();
        Self { patterns }
    }

    /// Filter carrying the built-in restart exclusions
    pub fn known_restarts() -> Self {
        Self::new(KNOWN_RESTART_EXCLUSIONS.iter().copied())
    }

    /// Whether a diagnostic about `locator` should be suppressed
    ///
    /// Patterns are consulted in order. Reaching a pattern that failed to
    /// compile ends the search with "do not suppress".
    pub fn is_excluded(&self, locator: &str) -> bool {
        for pattern in &self.patterns {
            match &pattern.compiled {
                Some(re) if re.is_match(locator) => return true,
                Some(_) => {}
                None => return false,
            }
        }
        false
    }

    /// Pattern sources in configured order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.source.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::known_restarts()
    }
}
