use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::observer::PollPolicy;

pub mod options;

pub use options::{JobOptions, Model, SpeakerCount};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Job polling settings
    pub observer: ObserverSettings,

    /// Report output settings
    pub report: ReportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverSettings {
    /// Pause before the first read, giving the job table time to render
    pub settle_delay_secs: u64,

    /// Fixed delay between two reads
    pub poll_interval_secs: u64,

    /// Give up after this long; `null` waits forever
    pub max_wait_secs: Option<u64>,

    /// Give up after this many reads; `null` means no limit
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Directory that receives one sub-directory per job
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            observer: ObserverSettings {
                settle_delay_secs: 3,
                poll_interval_secs: 2,
                max_wait_secs: Some(2 * 60 * 60),
                max_attempts: None,
            },
            report: ReportSettings {
                output_dir: PathBuf::from("outputs"),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate a configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // a file in the working directory wins
        let local_config = PathBuf::from("scribewatch.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("scribewatch").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.poll_policy()
            .validate()
            .context("Invalid observer settings")?;

        if self.report.output_dir.as_os_str().is_empty() {
            anyhow::bail!("report.output_dir must not be empty");
        }

        Ok(())
    }

    /// Polling policy derived from the observer settings
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            settle_delay: Duration::from_secs(self.observer.settle_delay_secs),
            interval: Duration::from_secs(self.observer.poll_interval_secs),
            max_wait: self.observer.max_wait_secs.map(Duration::from_secs),
            max_attempts: self.observer.max_attempts,
        }
    }

    /// Display current configuration
    pub fn display(&self) {
        let bound = |value: Option<String>| value.unwrap_or_else(|| "unbounded".to_string());

        println!("Current Configuration:");
        println!("  Settle delay: {}s", self.observer.settle_delay_secs);
        println!("  Poll interval: {}s", self.observer.poll_interval_secs);
        println!("  Max wait: {}", bound(self.observer.max_wait_secs.map(|s| format!("{}s", s))));
        println!("  Max attempts: {}", bound(self.observer.max_attempts.map(|n| n.to_string())));
        println!("  Output directory: {}", self.report.output_dir.display());
    }
}
