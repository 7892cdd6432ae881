//! Configuration management for the CLI

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use timeline_lib::exclusions::{KNOWN_RESTART_EXCLUSIONS, RESTART_THRESHOLD};

/// Environment variable prefix for every setting
const ENV_PREFIX: &str = "PODTL";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Locator patterns whose restart diagnostics are suppressed
    #[serde(default = "default_exclusions")]
    pub exclusions: Vec<String>,

    /// Omit zero-width intervals from written documents
    #[serde(default)]
    pub skip_instants: bool,

    /// Restarts tolerated before a container is reported
    #[serde(default = "default_restart_threshold")]
    pub restart_threshold: usize,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_restart_threshold() -> usize {
    RESTART_THRESHOLD
}

fn default_exclusions() -> Vec<String> {
    KNOWN_RESTART_EXCLUSIONS.iter().map(|s| s.to_string()).collect()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            exclusions: default_exclusions(),
            skip_instants: false,
            restart_threshold: default_restart_threshold(),
            log_format: LogFormat::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from an optional file, then the environment
    ///
    /// An explicitly named file must exist. The default location is only
    /// read when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => Some(config::File::from(path).required(true)),
            None => Self::default_path()
                .map(|base| config::File::with_name(&base.to_string_lossy()).required(false)),
        };

        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(file);
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("exclusions"),
            )
            .build()
            .context("Failed to load configuration")?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Base path of the default configuration file, without extension
    fn default_path() -> Option<PathBuf> {
        let home = dirs_next::home_dir()?;
        Some(home.join(".config").join("podtl").join("config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.exclusions.len(), KNOWN_RESTART_EXCLUSIONS.len());
        assert!(!config.skip_instants);
        assert_eq!(config.restart_threshold, 3);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("podtl.toml");
        std::fs::write(
            &path,
            "exclusions = [\"container/etcd$\"]\nskip_instants = true\nlog_format = \"json\"\n",
        )
        .unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.exclusions, vec!["container/etcd$".to_string()]);
        assert!(config.skip_instants);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(CliConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("podtl.json");
        std::fs::write(&path, "{\"skip_instants\": true, \"restart_threshold\": 1}").unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert!(config.skip_instants);
        assert_eq!(config.restart_threshold, 1);
        assert_eq!(config.exclusions, default_exclusions());
    }
}
