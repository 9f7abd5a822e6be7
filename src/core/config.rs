//! Configuration management

use crate::core::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default name of the append-only audit log written next to downloads
pub const AUDIT_LOG_FILE: &str = "_dependency-tracker.txt";

/// Default name of the per-directory subdirectory holding provenance records
pub const TRACKING_DIR: &str = ".tracking";

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub strategies: StrategyConfig,
    pub output: OutputConfig,
}

/// Which recording strategies are active
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Append every download to the raw audit log
    pub audit_log: bool,
    /// Write deduplicated provenance records on resolution
    pub provenance: bool,
    /// Record provenance when a lookup is satisfied from the local cache
    pub cache_hits: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name of the audit log
    pub audit_log_file: String,
    /// Directory name (relative to the artifact directory) for records
    pub tracking_dir: String,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            audit_log: true,
            provenance: true,
            cache_hits: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            audit_log_file: AUDIT_LOG_FILE.to_string(),
            tracking_dir: TRACKING_DIR.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::tracker_home()?.join("config.toml"))
    }

    /// Get the tracker home directory
    pub fn tracker_home() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("DEP_TRACKER_HOME") {
            return Ok(PathBuf::from(home));
        }

        ProjectDirs::from("org", "ops4j", "dep-tracker")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| Error::ConfigError {
                message: "Could not determine dep-tracker home directory".to_string(),
            })
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("output.audit_log_file", &self.output.audit_log_file),
            ("output.tracking_dir", &self.output.tracking_dir),
        ] {
            if value.is_empty() || value.contains(['/', '\\']) {
                return Err(Error::ConfigError {
                    message: format!("{} must be a plain file name, got {:?}", field, value),
                });
            }
        }
        Ok(())
    }
}
