//! Daemon configuration
//!
//! The bridge sections (`[vehicle]`, `[request]`, `[broadcast]`) plus an
//! optional `[simulation]` section driving a synthetic pose/range producer.

use std::path::Path;

use anyhow::{Context, Result};
use beacon_bridge::BridgeConfig;
use serde::{Deserialize, Serialize};

/// Complete daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(flatten)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl DaemonConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Synthetic producer: the vehicle drives a circle and passes a fixed
/// obstacle once per lap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Producer update rate
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,

    /// Circle radius in meters
    #[serde(default = "default_radius_m")]
    pub radius_m: f32,

    /// Time for one lap in seconds
    #[serde(default = "default_lap_secs")]
    pub lap_secs: f32,

    /// Obstacle position `[x, y]` in meters
    #[serde(default = "default_obstacle")]
    pub obstacle: [f32; 2],
}

fn default_rate_hz() -> u32 {
    10
}

fn default_radius_m() -> f32 {
    2.0
}

fn default_lap_secs() -> f32 {
    20.0
}

fn default_obstacle() -> [f32; 2] {
    [default_radius_m() + 0.5, 0.0]
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rate_hz: default_rate_hz(),
            radius_m: default_radius_m(),
            lap_secs: default_lap_secs(),
            obstacle: default_obstacle(),
        }
    }
}
