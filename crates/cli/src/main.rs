//! Pod timeline CLI
//!
//! A command-line tool for reconstructing pod and container lifecycle
//! intervals from recorded instants, inspecting the resulting documents,
//! and checking locators against the restart exclusion list.

mod commands;
mod config;
mod output;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use commands::{excluded, reconstruct, show};
use std::path::PathBuf;
use timeline_lib::ExclusionFilter;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Pod Timeline CLI
#[derive(Parser)]
#[command(name = "podtl")]
#[command(author, version, about = "Pod Timeline: lifecycle interval reconstruction", long_about = None)]
pub struct Cli {
    /// Configuration file (can also be set via PODTL_CONFIG env var)
    #[arg(long, env = "PODTL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log format for diagnostics written to stderr
    #[arg(long, global = true)]
    pub log_format: Option<config::LogFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconstruct intervals from a file of instants
    Reconstruct {
        /// Instant document to read
        #[arg(long, short)]
        input: PathBuf,

        /// Start of the observation window (RFC3339)
        #[arg(long, value_parser = parse_timestamp)]
        start: DateTime<Utc>,

        /// End of the observation window (RFC3339)
        #[arg(long, value_parser = parse_timestamp)]
        end: DateTime<Utc>,

        /// Write the interval document here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Omit zero-width intervals from the document
        #[arg(long)]
        skip_instants: bool,

        /// Restarts tolerated before a container is reported (default 3)
        #[arg(long)]
        restart_threshold: Option<usize>,

        /// Write Prometheus metrics in text exposition format after the run
        #[arg(long)]
        metrics_file: Option<PathBuf>,
    },

    /// Show an interval document
    Show {
        /// Interval document to read
        #[arg(long, short)]
        input: PathBuf,

        /// Output format
        #[arg(long, short, default_value = "table")]
        format: output::OutputFormat,
    },

    /// Check locators against the exclusion list
    Excluded {
        /// Flattened locators to check
        #[arg(required = true)]
        locators: Vec<String>,
    },
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC3339 timestamp {:?}: {}", raw, e))
}

/// Install the tracing subscriber, writing to stderr
fn init_tracing(format: config::LogFormat, verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        config::LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        config::LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let settings = config::CliConfig::load(cli.config.as_deref())?;
    init_tracing(cli.log_format.unwrap_or(settings.log_format), cli.verbose);
    debug!(exclusions = settings.exclusions.len(), "CLI configured");

    // The exclusion list is fixed for the lifetime of the process
    let filter = ExclusionFilter::new(settings.exclusions.iter().cloned());

    // Execute command
    match cli.command {
        Commands::Reconstruct {
            input,
            start,
            end,
            output,
            skip_instants,
            restart_threshold,
            metrics_file,
        } => {
            let args = reconstruct::ReconstructArgs {
                input,
                start,
                end,
                output,
                skip_instants: skip_instants || settings.skip_instants,
                restart_threshold: restart_threshold.unwrap_or(settings.restart_threshold),
                metrics_file,
            };
            reconstruct::run(&args, &filter)?;
        }
        Commands::Show { input, format } => {
            show::show_intervals(&input, format)?;
        }
        Commands::Excluded { locators } => {
            excluded::check_locators(&filter, &locators);
        }
    }

    Ok(())
}
