// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Configuration file handling.
//!
//! Read-only TOML settings for the tick interval and the terminal UI.
//! Default path: `/etc/tempctl/config.toml`

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/tempctl/config.toml";

/// Default delay between two ticks, in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Default input poll timeout of the terminal loop, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Default desired-temperature change per slider key press.
pub const DEFAULT_SLIDER_STEP: f64 = 0.5;

/// Default step-size change per slider key press.
pub const DEFAULT_STEP_SLIDER_STEP: f64 = 0.1;

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Simulation settings.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Terminal UI settings.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Settings for the step scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Delay between two ticks of a run, in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Settings for the terminal client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Maximum time the event loop waits for a key press, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Desired-temperature change per arrow key on the slider.
    #[serde(default = "default_slider_step")]
    pub slider_step: f64,

    /// Step-size change per arrow key on the step slider.
    #[serde(default = "default_step_slider_step")]
    pub step_slider_step: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            slider_step: DEFAULT_SLIDER_STEP,
            step_slider_step: DEFAULT_STEP_SLIDER_STEP,
        }
    }
}

impl UiConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Reject values the event loops cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.simulation.tick_interval_ms == 0 {
            return Err("simulation.tick_interval_ms must be greater than 0".to_string());
        }
        if self.ui.poll_interval_ms == 0 {
            return Err("ui.poll_interval_ms must be greater than 0".to_string());
        }
        for (name, value) in [
            ("ui.slider_step", self.ui.slider_step),
            ("ui.step_slider_step", self.ui.step_slider_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be a positive number (got {value})"));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load config from a TOML file, or return the default if the file doesn't exist.
pub fn load_config(path: &Path) -> io::Result<Config> {
    if !path.exists() {
        log::info!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(path)?;
    let config = parse_config(&contents)?;

    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse and validate config text.
pub fn parse_config(contents: &str) -> io::Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to parse config: {e}"),
        )
    })?;

    config.validate().map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("Invalid config: {e}"))
    })?;

    Ok(config)
}

/// Resolve the config file path from CLI arg or default.
pub fn resolve_config_path(cli_path: Option<&str>) -> PathBuf {
    cli_path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn default_tick_interval() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_slider_step() -> f64 {
    DEFAULT_SLIDER_STEP
}

fn default_step_slider_step() -> f64 {
    DEFAULT_STEP_SLIDER_STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.simulation.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_sections() {
        let cfg = parse_config(
            r#"
            [simulation]
            tick_interval_ms = 200

            [ui]
            slider_step = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.simulation.tick_interval_ms, 200);
        assert_eq!(cfg.ui.slider_step, 1.0);
        assert_eq!(cfg.ui.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = parse_config("[simulation]\ntick_interval_ms = 0\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("tick_interval_ms"));
    }

    #[test]
    fn test_negative_slider_step_rejected() {
        assert!(parse_config("[ui]\nstep_slider_step = -0.1\n").is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = parse_config("[simulation\n").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = load_config(Path::new("/nonexistent/tempctl/config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_resolve_config_path() {
        assert_eq!(
            resolve_config_path(None),
            PathBuf::from(DEFAULT_CONFIG_PATH)
        );
        assert_eq!(
            resolve_config_path(Some("/tmp/t.toml")),
            PathBuf::from("/tmp/t.toml")
        );
    }
}
