//! Launcher configuration parsing and validation.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

fn default_php_binary() -> String {
    "php".into()
}

fn default_port_range_start() -> u16 {
    8000
}

fn default_port_range_size() -> u16 {
    100
}

fn default_poll_interval_seconds() -> u64 {
    1
}

fn default_graceful_timeout_seconds() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

/// Global configuration parsed from an optional TOML file.
///
/// Every field has a default, so an empty file (or no file at all) yields a
/// working configuration. CLI flags override individual fields after load.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct LauncherConfig {
    /// PHP interpreter binary (name on `PATH` or absolute path).
    #[serde(default = "default_php_binary")]
    pub php_binary: String,
    /// First candidate port for the availability probe.
    #[serde(default = "default_port_range_start")]
    pub port_range_start: u16,
    /// Number of candidate ports to probe.
    #[serde(default = "default_port_range_size")]
    pub port_range_size: u16,
    /// Seconds between child liveness polls.
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
    /// Seconds to wait for graceful termination before forcing a kill.
    #[serde(default = "default_graceful_timeout_seconds")]
    pub graceful_timeout_seconds: u64,
    /// Whether to open the served URL in the default browser after launch.
    #[serde(default = "default_true")]
    pub open_browser: bool,
    /// Whether to write a minimal `index.php` when the root has no index.
    #[serde(default = "default_true")]
    pub create_landing_page: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            php_binary: default_php_binary(),
            port_range_start: default_port_range_start(),
            port_range_size: default_port_range_size(),
            poll_interval_seconds: default_poll_interval_seconds(),
            graceful_timeout_seconds: default_graceful_timeout_seconds(),
            open_browser: true,
            create_landing_page: true,
        }
    }
}

impl LauncherConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Interval between child liveness polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Bounded wait for graceful termination before the forced kill.
    #[must_use]
    pub fn graceful_timeout(&self) -> Duration {
        Duration::from_secs(self.graceful_timeout_seconds)
    }

    /// Validate field constraints after parsing or CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` on an empty binary name, an empty or
    /// overflowing port range, or a zero poll interval.
    pub fn validate(&self) -> Result<()> {
        if self.php_binary.trim().is_empty() {
            return Err(AppError::Config("php_binary must not be empty".into()));
        }

        if self.port_range_size == 0 {
            return Err(AppError::Config(
                "port_range_size must be greater than zero".into(),
            ));
        }

        if self
            .port_range_start
            .checked_add(self.port_range_size - 1)
            .is_none()
        {
            return Err(AppError::Config(format!(
                "port range {}+{} exceeds the maximum port number",
                self.port_range_start, self.port_range_size
            )));
        }

        if self.poll_interval_seconds == 0 {
            return Err(AppError::Config(
                "poll_interval_seconds must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
