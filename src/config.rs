//! Merge configuration loaded from TOML.

use crate::merge::DEFAULT_THRESHOLD_SECS;
use crate::timestamp::TimeBasis;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default suffix appended to the GPX file name for the output.
pub const DEFAULT_OUTPUT_SUFFIX: &str = ".new.gpx";

/// Settings for a merge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Maximum start/end gap between the recordings, seconds (exclusive)
    pub plausibility_threshold_secs: i64,
    /// Appended to the GPX path to name the output
    pub output_suffix: String,
    /// How timestamps are turned into epoch seconds
    pub time_basis: TimeBasis,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            plausibility_threshold_secs: DEFAULT_THRESHOLD_SECS,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            time_basis: TimeBasis::Local,
        }
    }
}

impl MergeConfig {
    /// Reject values the merge cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plausibility_threshold_secs <= 0 {
            return Err(ConfigError::InvalidThreshold(
                self.plausibility_threshold_secs,
            ));
        }
        if self.output_suffix.is_empty() {
            return Err(ConfigError::EmptySuffix);
        }
        Ok(())
    }
}

/// Get the configuration directory.
pub fn get_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "gpx-hr-merge", "GpxHrMerge")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the default configuration file path.
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<MergeConfig, ConfigError> {
    let config: MergeConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the default location is
/// read if present and defaults are used otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<MergeConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match get_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(MergeConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

    tracing::debug!("Loaded configuration from {}", path.display());
    parse_config(&content)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Plausibility threshold must be positive, got {0}")]
    InvalidThreshold(i64),

    #[error("Output suffix must not be empty")]
    EmptySuffix,
}
