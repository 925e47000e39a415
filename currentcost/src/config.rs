// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Monitor configuration, read from the `[current_cost]` table of a TOML file.
//!
//! ```toml
//! [current_cost]
//! port = "/dev/ttyUSB0"
//! baud_rate = 57600
//! clamp_count = 3
//! use_utc_timestamps = true
//! log_level = "info"
//! ```

use currentcost_error::{CurrentCostError, Result, ResultExt};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BAUD_RATE: u32 = 57_600;
pub const DEFAULT_CLAMP_COUNT: u8 = 3;
pub const MAX_CLAMP_COUNT: u8 = 3;
pub const DEFAULT_HISTORY_TIMEOUT_SECS: f64 = 20.0;
pub const DEFAULT_RECONNECT_DELAY_SECS: f64 = 5.0;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonitorConfig {
    /// Serial device path, e.g. `/dev/ttyUSB0` or `COM3`
    pub port: String,
    #[serde(default = "default_baud_rate", alias = "baudrate")]
    pub baud_rate: u32,
    /// Number of clamps on the whole-house transmitter
    #[serde(default = "default_clamp_count")]
    pub clamp_count: u8,
    #[serde(default = "default_use_utc_timestamps")]
    pub use_utc_timestamps: bool,
    #[serde(default = "default_history_timeout_secs")]
    pub history_timeout_secs: f64,
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: f64,
    /// Log level used when `RUST_LOG` is not set
    #[serde(default, alias = "loglevel")]
    pub log_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    current_cost: Option<MonitorConfig>,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_clamp_count() -> u8 {
    DEFAULT_CLAMP_COUNT
}

fn default_use_utc_timestamps() -> bool {
    true
}

fn default_history_timeout_secs() -> f64 {
    DEFAULT_HISTORY_TIMEOUT_SECS
}

fn default_reconnect_delay_secs() -> f64 {
    DEFAULT_RECONNECT_DELAY_SECS
}

impl MonitorConfig {
    /// Configuration for `port` with every other setting at its default.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            clamp_count: DEFAULT_CLAMP_COUNT,
            use_utc_timestamps: true,
            history_timeout_secs: DEFAULT_HISTORY_TIMEOUT_SECS,
            reconnect_delay_secs: DEFAULT_RECONNECT_DELAY_SECS,
            log_level: None,
        }
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    /// Returns [`CurrentCostError::Configuration`] if the file is missing or unreadable,
    /// is not valid TOML, lacks the `[current_cost]` table or its `port`, or holds an
    /// invalid value.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CurrentCostError::configuration(format!(
                "Invalid configuration file path: {}",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path)
            .configuration(format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    /// # Errors
    /// As [`from_file`](Self::from_file), minus the file system failures.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).configuration("invalid configuration")?;
        let config = file
            .current_cost
            .ok_or_else(|| CurrentCostError::configuration("missing [current_cost] section"))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`CurrentCostError::Configuration`] naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(CurrentCostError::configuration("port must not be empty"));
        }
        if self.baud_rate == 0 {
            return Err(CurrentCostError::configuration("baud_rate must be positive"));
        }
        if !(1..=MAX_CLAMP_COUNT).contains(&self.clamp_count) {
            return Err(CurrentCostError::configuration(format!(
                "clamp_count must be between 1 and {MAX_CLAMP_COUNT}, got {}",
                self.clamp_count
            )));
        }
        positive_duration("history_timeout_secs", self.history_timeout_secs)?;
        positive_duration("reconnect_delay_secs", self.reconnect_delay_secs)?;
        if let Some(level) = &self.log_level {
            if tracing_level(level).is_none() {
                return Err(CurrentCostError::configuration(format!(
                    "unknown log_level '{level}'"
                )));
            }
        }
        Ok(())
    }

    pub fn history_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.history_timeout_secs)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_HISTORY_TIMEOUT_SECS))
    }

    /// `tracing` level name for `log_level`, or the default.
    pub fn log_filter(&self) -> &'static str {
        self.log_level
            .as_deref()
            .and_then(tracing_level)
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.reconnect_delay_secs)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_RECONNECT_DELAY_SECS))
    }
}

/// Accepts `tracing` level names and the `warning`/`critical` spellings, any case.
fn tracing_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" => Some("error"),
        _ => None,
    }
}

fn positive_duration(field: &str, secs: f64) -> Result<Duration> {
    let duration = Duration::try_from_secs_f64(secs)
        .configuration(format!("{field} must be a finite number of seconds"))?;
    if duration.is_zero() {
        return Err(CurrentCostError::configuration(format!(
            "{field} must be positive"
        )));
    }
    Ok(duration)
}
