//! Golden-file tests for recorded pod lifecycles
//!
//! Each fixture is a recorded set of instants; the matching
//! `.expected.json` is the byte-exact document reconstruction must produce.

use chrono::{DateTime, Utc};
use tempfile::TempDir;
use timeline_lib::{ordering, reconstruct, serialization, summarize, Interval, TimelineError};

const SIMPLE: &str = include_str!("fixtures/pod_test_01_simple.json");
const SIMPLE_EXPECTED: &str = include_str!("fixtures/pod_test_01_simple.expected.json");
const TRAILING: &str = include_str!("fixtures/pod_test_02_trailing_ready.json");
const TRAILING_EXPECTED: &str = include_str!("fixtures/pod_test_02_trailing_ready.expected.json");

fn rfc3339(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

fn reconstruct_fixture(data: &str, start: &str, end: &str) -> Vec<Interval> {
    let instants = serialization::instants_from_json(data.as_bytes()).unwrap();
    reconstruct(&instants, rfc3339(start), rfc3339(end)).unwrap()
}

#[test]
fn test_interval_creation() {
    let result = reconstruct_fixture(SIMPLE, "2022-03-07T12:00:00Z", "2022-03-07T23:00:00Z");
    let json = serialization::intervals_to_json(&result).unwrap();
    assert_eq!(String::from_utf8(json).unwrap(), SIMPLE_EXPECTED);
}

#[test]
fn test_interval_creation_trailing_ready() {
    let result = reconstruct_fixture(TRAILING, "2022-03-07T12:00:00Z", "2022-03-10T23:00:00Z");
    let json = serialization::intervals_to_json(&result).unwrap();
    assert_eq!(String::from_utf8(json).unwrap(), TRAILING_EXPECTED);
}

#[test]
fn test_expected_documents_reserialize_identically() {
    for expected in [SIMPLE_EXPECTED, TRAILING_EXPECTED] {
        let parsed = serialization::intervals_from_json(expected.as_bytes()).unwrap();
        assert!(ordering::is_ordered(&parsed));
        let written = serialization::intervals_to_json(&parsed).unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), expected);
    }
}

#[test]
fn test_synthesized_intervals_are_marked() {
    let result = reconstruct_fixture(TRAILING, "2022-03-07T12:00:00Z", "2022-03-10T23:00:00Z");
    let synthesized: Vec<&str> = result
        .iter()
        .filter(|i| i.is_synthesized())
        .map(|i| i.message.as_str())
        .collect();
    assert_eq!(
        synthesized,
        vec![
            "constructed/true reason/ContainerWait missed real \"ContainerWait\"",
            "constructed/true reason/NotReady missed real \"NotReady\"",
        ]
    );

    let summary = summarize(&result);
    assert_eq!(summary.intervals, 7);
    assert_eq!(summary.synthesized, 2);
    assert_eq!(summary.locators, 2);
}

#[test]
fn test_inverted_window_is_rejected() {
    let instants = serialization::instants_from_json(SIMPLE.as_bytes()).unwrap();
    let err = reconstruct(
        &instants,
        rfc3339("2022-03-07T23:00:00Z"),
        rfc3339("2022-03-07T12:00:00Z"),
    )
    .unwrap_err();
    assert!(matches!(err, TimelineError::InvalidWindow { .. }));
}

#[test]
fn test_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("instants.json");
    let output = dir.path().join("intervals.json");
    std::fs::write(&input, SIMPLE).unwrap();

    let instants = serialization::read_instants_file(&input).unwrap();
    let result = reconstruct(
        &instants,
        rfc3339("2022-03-07T12:00:00Z"),
        rfc3339("2022-03-07T23:00:00Z"),
    )
    .unwrap();
    serialization::write_intervals_file(&output, &result).unwrap();

    assert_eq!(std::fs::read_to_string(&output).unwrap(), SIMPLE_EXPECTED);
    assert_eq!(serialization::read_intervals_file(&output).unwrap(), result);
}

#[test]
fn test_reconstruction_output_cannot_be_read_as_instants() {
    let err = serialization::instants_from_json(SIMPLE_EXPECTED.as_bytes()).unwrap_err();
    assert!(matches!(err, TimelineError::NotAnInstant { .. }));
}
