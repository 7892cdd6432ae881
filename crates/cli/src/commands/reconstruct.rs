//! Reconstruction command

use crate::output::print_warning;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use timeline_lib::reconstruct::lifecycle::CONTAINER_START;
use timeline_lib::{
    reconstruct, serialization, summarize, ExclusionFilter, Interval, Locator, StructuredLogger,
    TimelineMetrics,
};
use tracing::warn;

/// Arguments for one reconstruction run, after config defaults are applied
#[derive(Debug, Clone)]
pub struct ReconstructArgs {
    pub input: PathBuf,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub output: Option<PathBuf>,
    pub skip_instants: bool,
    pub restart_threshold: usize,
    pub metrics_file: Option<PathBuf>,
}

/// Read instants, reconstruct intervals and write the canonical document
pub fn run(args: &ReconstructArgs, filter: &ExclusionFilter) -> Result<()> {
    let logger = StructuredLogger::new(args.input.display().to_string());
    let metrics = TimelineMetrics::new();

    let instants = serialization::read_instants_file(&args.input)
        .with_context(|| format!("Failed to read instants from {}", args.input.display()))?;
    logger.log_run_started(instants.len(), args.start, args.end);

    let started = std::time::Instant::now();
    let intervals = reconstruct(&instants, args.start, args.end)?;
    let elapsed = started.elapsed().as_secs_f64();

    let summary = summarize(&intervals);
    metrics.record_run(instants.len(), &summary, elapsed);
    logger.log_reconstruction(&summary, elapsed);

    report_restarts(&intervals, args.restart_threshold, filter, &logger);

    let items = if args.skip_instants {
        intervals.iter().filter(|i| !i.is_instant()).count()
    } else {
        intervals.len()
    };
    match &args.output {
        Some(path) => {
            if args.skip_instants {
                serialization::write_spans_file(path, &intervals)?;
            } else {
                serialization::write_intervals_file(path, &intervals)?;
            }
            logger.log_output_written(&path.display().to_string(), items, args.skip_instants);
        }
        None => {
            let json = if args.skip_instants {
                serialization::spans_to_json(&intervals)?
            } else {
                serialization::intervals_to_json(&intervals)?
            };
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&json)?;
            writeln!(stdout)?;
            logger.log_output_written("stdout", items, args.skip_instants);
        }
    }

    if let Some(path) = &args.metrics_file {
        let text = metrics.render().context("Failed to encode metrics")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
    }

    Ok(())
}

/// Restart counts of containers that restarted more than `threshold` times
///
/// Every `ContainerStart` after a container's first is one restart.
pub fn restarted_containers(intervals: &[Interval], threshold: usize) -> BTreeMap<&Locator, usize> {
    let mut starts: BTreeMap<&Locator, usize> = BTreeMap::new();
    for interval in intervals {
        if interval.locator.is_container() && interval.reason() == Some(CONTAINER_START) {
            *starts.entry(&interval.locator).or_default() += 1;
        }
    }
    starts
        .into_iter()
        .map(|(locator, count)| (locator, count - 1))
        .filter(|(_, restarts)| *restarts > threshold)
        .collect()
}

fn report_restarts(
    intervals: &[Interval],
    threshold: usize,
    filter: &ExclusionFilter,
    logger: &StructuredLogger,
) {
    for (locator, restarts) in restarted_containers(intervals, threshold) {
        let excluded = filter.is_excluded(locator.as_str());
        logger.log_exclusion(locator.as_str(), excluded);
        if excluded {
            continue;
        }
        warn!(locator = %locator, restarts = restarts, threshold = threshold, "Container restarted");
        print_warning(&format!("{} restarted {} time(s)", locator, restarts));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use timeline_lib::Level;

    fn start(locator: &Locator, secs: u32) -> Interval {
        let at = Utc.with_ymd_and_hms(2022, 3, 7, 18, 41, secs).unwrap();
        Interval {
            level: Level::Info,
            locator: locator.clone(),
            message: "constructed/true reason/ContainerStart cause/ ".to_string(),
            from: at,
            to: at,
        }
    }

    #[test]
    fn test_restarted_containers() {
        let app = Locator::container("ns", "p", "u", "app");
        let sidecar = Locator::container("ns", "p", "u", "sidecar");
        let mut intervals = vec![start(&sidecar, 0), start(&sidecar, 1)];
        intervals.extend((0..5).map(|n| start(&app, n * 10)));

        let restarted = restarted_containers(&intervals, 0);
        assert_eq!(restarted.get(&app), Some(&4));
        assert_eq!(restarted.get(&sidecar), Some(&1));
    }

    #[test]
    fn test_restarts_at_threshold_are_tolerated() {
        let app = Locator::container("ns", "p", "u", "app");
        let intervals: Vec<Interval> = (0..4).map(|n| start(&app, n * 10)).collect();
        assert!(restarted_containers(&intervals, 3).is_empty());

        let intervals: Vec<Interval> = (0..5).map(|n| start(&app, n * 10)).collect();
        assert_eq!(restarted_containers(&intervals, 3).get(&app), Some(&4));
    }

    #[test]
    fn test_pod_level_intervals_are_ignored() {
        let pod = Locator::pod("ns", "p", "u");
        let intervals = vec![start(&pod, 1), start(&pod, 2)];
        assert!(restarted_containers(&intervals, 0).is_empty());
    }
}
