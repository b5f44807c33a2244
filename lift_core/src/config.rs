//! Configuration file support for Lift.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/lift/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub plan: PlanDefaults,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Session timer configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerConfig {
    /// Period of the host's tick driver in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Delay between a step completing and the session moving on
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,

    /// Low-time warnings fire for remaining values 1..=warning_seconds
    #[serde(default = "default_warning_seconds")]
    pub warning_seconds: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            grace_ms: default_grace_ms(),
            warning_seconds: default_warning_seconds(),
        }
    }
}

/// Defaults used when creating new plans
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanDefaults {
    #[serde(default = "default_rest_seconds")]
    pub default_rest_seconds: u32,

    #[serde(default = "default_sets")]
    pub default_sets: u32,

    #[serde(default = "default_exercise_seconds")]
    pub default_exercise_seconds: u32,
}

impl Default for PlanDefaults {
    fn default() -> Self {
        Self {
            default_rest_seconds: default_rest_seconds(),
            default_sets: default_sets(),
            default_exercise_seconds: default_exercise_seconds(),
        }
    }
}

/// Colour theme for the terminal renderer
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Presentation settings, passed explicitly to the host renderer
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    #[serde(default)]
    pub theme: Theme,
}

// Default value functions
fn default_tick_ms() -> u64 {
    1000
}

fn default_grace_ms() -> u64 {
    500
}

fn default_warning_seconds() -> u32 {
    3
}

fn default_rest_seconds() -> u32 {
    crate::types::DEFAULT_REST_SECONDS
}

fn default_sets() -> u32 {
    crate::types::DEFAULT_SETS
}

fn default_exercise_seconds() -> u32 {
    45
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .ok_or_else(|| Error::Config("Unable to determine config directory".into()))?;
        Ok(base.join("lift").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the timer can't work with
    pub fn validate(&self) -> Result<()> {
        if self.timer.tick_ms == 0 {
            return Err(Error::Config("timer.tick_ms must be greater than 0".into()));
        }
        if self.plan.default_exercise_seconds == 0 {
            return Err(Error::Config(
                "plan.default_exercise_seconds must be greater than 0".into(),
            ));
        }
        if self.plan.default_sets == 0 {
            return Err(Error::Config("plan.default_sets must be at least 1".into()));
        }
        Ok(())
    }
}
