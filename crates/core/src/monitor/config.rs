use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discrete proximity sensitivity presets, mapped to the normalized
/// margin applied around the face box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
}

impl Sensitivity {
    pub const ALL: &[Sensitivity] = &[Sensitivity::Low, Sensitivity::Medium, Sensitivity::High];

    /// Proximity margin in normalized units. Higher sensitivity means a
    /// tighter margin (the hand must get closer before it counts).
    pub fn margin(self) -> f64 {
        match self {
            Sensitivity::Low => 0.12,
            Sensitivity::Medium => 0.08,
            Sensitivity::High => 0.05,
        }
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sensitivity::Low => write!(f, "Low"),
            Sensitivity::Medium => write!(f, "Medium"),
            Sensitivity::High => write!(f, "High"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("touch threshold must be positive, got {0}")]
    NonPositiveThreshold(f64),
    #[error("proximity margin must be positive, got {0}")]
    NonPositiveMargin(f64),
}

/// Runtime monitor configuration.
///
/// Mutable at any time: threshold and margin take effect on the next
/// evaluation; the sound flag applies immediately (disabling silences a
/// running alarm before the setter returns; the coordinator enforces
/// that).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub touch_threshold_secs: f64,
    pub proximity_margin: f64,
    pub sound_enabled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            touch_threshold_secs: 1.0,
            proximity_margin: Sensitivity::Medium.margin(),
            sound_enabled: true,
        }
    }
}

impl MonitorConfig {
    pub fn new(
        touch_threshold_secs: f64,
        proximity_margin: f64,
        sound_enabled: bool,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            touch_threshold_secs,
            proximity_margin,
            sound_enabled,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.touch_threshold_secs <= 0.0 {
            return Err(ConfigError::NonPositiveThreshold(self.touch_threshold_secs));
        }
        if self.proximity_margin <= 0.0 {
            return Err(ConfigError::NonPositiveMargin(self.proximity_margin));
        }
        Ok(())
    }

    pub fn set_sensitivity(&mut self, sensitivity: Sensitivity) {
        self.proximity_margin = sensitivity.margin();
    }

    /// Load a config from a JSON file, rejecting invalid values.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
