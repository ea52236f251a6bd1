//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the crossing-config.toml file.
//! It provides a centralized way to configure the tide-gauge station, the crossing
//! thresholds, and how the report is displayed.
//!
//! Every section is optional in the file; missing keys take the Cramond defaults.

use crate::classifier::Thresholds;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "crossing-config.toml";

/// Errors from saving or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialize: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Application configuration loaded from crossing-config.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Tide-gauge station configuration
    pub station: StationConfig,
    /// Crossing thresholds in metres
    pub thresholds: Thresholds,
    /// Report and refresh configuration
    pub display: DisplayConfig,
}

/// Environment Agency tide-gauge station configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StationConfig {
    /// Station reference (e.g., "E70839" for Cramond)
    pub id: String,
    /// Human-readable station name for reference
    pub name: String,
    /// Flood-monitoring API root
    pub base_url: String,
    /// Number of readings to request (1..=100)
    pub limit: usize,
    /// IANA zone used to display reading times
    pub timezone: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

/// Which way the trend arrow points for a rising tide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendArrow {
    /// Coming in is shown as an up arrow
    Standard,
    /// Coming in is shown as a down arrow
    Inverted,
}

/// Display and refresh configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Draw the ASCII chart under the status block
    pub show_chart: bool,
    /// Show the "soon underwater" banner
    pub show_warning: bool,
    /// Arrow convention for the trend line
    pub trend_arrow: TrendArrow,
    /// Chart height in text rows
    pub chart_rows: usize,
    /// Poll interval in watch mode, in seconds
    pub refresh_secs: u64,
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            id: "E70839".to_string(),
            name: "Cramond".to_string(),
            base_url: "https://environment.data.gov.uk/flood-monitoring".to_string(),
            limit: crate::MAX_READINGS,
            timezone: "Europe/London".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            show_chart: true,
            show_warning: true,
            trend_arrow: TrendArrow::Standard,
            chart_rows: 16,
            refresh_secs: 300,
        }
    }
}

impl StationConfig {
    /// Parse the configured display zone.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid(format!("unknown timezone: {}", self.timezone)))
    }

    /// Public gauge page for the station, shown as the data source link.
    pub fn source_page(&self) -> String {
        format!(
            "{}/tidegauge/index.html#filter=7&station={}",
            self.base_url.trim_end_matches('/'),
            self.id
        )
    }
}

impl Config {
    /// Load configuration from crossing-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(station = %config.station.name, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file, using defaults (Cramond)");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults (Cramond)");
                Self::default()
            }
        }
    }

    /// Write this configuration to `path` as pretty TOML
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// Reject combinations that would make the report meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !t.underwater_value.is_finite() || !t.danger_value.is_finite() {
            return Err(ConfigError::Invalid("thresholds must be finite".to_string()));
        }
        if t.danger_value > t.underwater_value {
            return Err(ConfigError::Invalid(format!(
                "danger_value ({}) must not be above underwater_value ({})",
                t.danger_value, t.underwater_value
            )));
        }
        if self.station.limit == 0 || self.station.limit > crate::MAX_READINGS {
            return Err(ConfigError::Invalid(format!(
                "station.limit must be between 1 and {}",
                crate::MAX_READINGS
            )));
        }
        if self.station.timeout_secs == 0 {
            return Err(ConfigError::Invalid("station.timeout_secs must be positive".to_string()));
        }
        if self.display.chart_rows < 2 {
            return Err(ConfigError::Invalid("display.chart_rows must be at least 2".to_string()));
        }
        if self.display.refresh_secs == 0 {
            return Err(ConfigError::Invalid("display.refresh_secs must be positive".to_string()));
        }
        self.station.tz()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.station.id, "E70839");
        assert_eq!(config.station.limit, 100);
        assert_eq!(config.thresholds.underwater_value, -0.80);
        assert_eq!(config.thresholds.danger_value, -1.10);
        assert_eq!(config.display.trend_arrow, TrendArrow::Standard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.station.id, parsed.station.id);
        assert_eq!(config.thresholds, parsed.thresholds);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str(
            r#"
[display]
trend_arrow = "inverted"
show_chart = false
"#,
        )
        .unwrap();
        assert_eq!(parsed.display.trend_arrow, TrendArrow::Inverted);
        assert!(!parsed.display.show_chart);
        assert!(parsed.display.show_warning);
        assert_eq!(parsed.station.id, "E70839");
        assert_eq!(parsed.thresholds.danger_value, -1.10);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.station.id, "E70839");
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "this is = = not toml").unwrap();
        let config = Config::load_from_path(file.path());
        assert_eq!(config.station.name, "Cramond");
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.thresholds.underwater_value = -0.75;
        config.display.refresh_secs = 60;
        config.save_to_path(file.path()).unwrap();

        let loaded = Config::load_from_path(file.path());
        assert_eq!(loaded.thresholds.underwater_value, -0.75);
        assert_eq!(loaded.display.refresh_secs, 60);
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = Config::default();
        config.thresholds.danger_value = -0.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_bad_limit_and_timezone() {
        let mut config = Config::default();
        config.station.limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.station.limit = 101;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.station.timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_source_page() {
        let config = Config::default();
        assert_eq!(
            config.station.source_page(),
            "https://environment.data.gov.uk/flood-monitoring/tidegauge/index.html#filter=7&station=E70839"
        );
    }
}
