//! Canonical interval ordering
//!
//! Total order: `from` ascending, then the locator's flattened form
//! ascending. The sort is stable, so intervals sharing both keys keep the
//! order in which they were produced.

use crate::models::Interval;
use std::cmp::Ordering;

/// Compare two intervals by start time, then locator
pub fn compare(a: &Interval, b: &Interval) -> Ordering {
    a.from
        .cmp(&b.from)
        .then_with(|| a.locator.as_str().cmp(b.locator.as_str()))
}

/// Sort intervals into canonical order
pub fn order(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by(compare);
    intervals
}

/// Check that a list is already in canonical order
pub fn is_ordered(intervals: &[Interval]) -> bool {
    intervals
        .windows(2)
        .all(|pair| compare(&pair[0], &pair[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, Locator};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 3, 7, 22, 47, secs).unwrap()
    }

    fn interval(locator: &Locator, message: &str, from: u32) -> Interval {
        Interval {
            level: Level::Info,
            locator: locator.clone(),
            message: message.to_string(),
            from: at(from),
            to: at(from),
        }
    }

    #[test]
    fn test_orders_by_time_then_locator() {
        let pod = Locator::pod("ns", "web", "u1");
        let container = Locator::container("ns", "web", "u1", "app");
        let other = Locator::pod("ns", "api", "u2");

        let sorted = order(vec![
            interval(&container, "c", 4),
            interval(&pod, "p", 4),
            interval(&other, "o", 7),
            interval(&other, "early", 1),
        ]);

        let messages: Vec<&str> = sorted.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["early", "p", "c", "o"]);
        assert!(is_ordered(&sorted));
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let pod = Locator::pod("ns", "web", "u1");
        let sorted = order(vec![
            interval(&pod, "first", 3),
            interval(&pod, "second", 3),
            interval(&pod, "third", 3),
        ]);
        let messages: Vec<&str> = sorted.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_order_is_independent_of_input_permutation() {
        let a = Locator::pod("ns", "a", "u1");
        let b = Locator::container("ns", "a", "u1", "b");
        let items = vec![interval(&b, "b", 2), interval(&a, "a", 2), interval(&a, "z", 1)];
        let mut reversed = items.clone();
        reversed.reverse();
        assert_eq!(order(items), order(reversed));
    }

    #[test]
    fn test_is_ordered_detects_violation() {
        let pod = Locator::pod("ns", "web", "u1");
        assert!(!is_ordered(&[interval(&pod, "late", 9), interval(&pod, "early", 1)]));
        assert!(is_ordered(&[]));
    }
}
