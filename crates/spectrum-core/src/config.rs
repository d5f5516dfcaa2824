//! Configuration loading for the simulation core.
//!
//! All settings are loaded from a TOML configuration file; every section
//! is optional and falls back to its defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::components::identity::WeightCategory;

/// Complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpectrumConfig {
    /// The identity pinned at the origin
    #[serde(default)]
    pub keeper: KeeperConfig,
    /// Tick scheduler settings
    #[serde(default)]
    pub tick: TickConfig,
    /// Zone engine settings
    #[serde(default)]
    pub zones: ZoneConfig,
    /// Defaults for items without explicit values
    #[serde(default)]
    pub items: ItemConfig,
    /// Position generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl SpectrumConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: SpectrumConfig = toml::from_str(content)?;
        config.generator.origins = config
            .generator
            .origins
            .into_iter()
            .map(|(origin, category)| (origin.to_lowercase(), category))
            .collect();
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values the core cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keeper.identity.trim().is_empty() {
            return Err(ConfigError::Invalid("keeper.identity is empty".into()));
        }
        if !(0.0..=1.0).contains(&self.tick.toward_fraction) {
            return Err(ConfigError::Invalid(format!(
                "tick.toward_fraction {} is outside [0, 1]",
                self.tick.toward_fraction
            )));
        }
        if self.zones.max_hull_points < 4 {
            return Err(ConfigError::Invalid(
                "zones.max_hull_points must be at least 4".into(),
            ));
        }
        if !(self.zones.boundary_epsilon >= 0.0) {
            return Err(ConfigError::Invalid(
                "zones.boundary_epsilon must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Keeper settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
    pub identity: String,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            identity: "keeper@spectrum.local".to_string(),
        }
    }
}

/// Tick scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Fraction of the gap covered by origin and identity headings
    pub toward_fraction: f64,
    /// Units moved by an axis heading
    pub axis_step: i32,
    /// Tick number the first run uses
    pub start_tick: u64,
    /// Wall-clock interval for the CLI driver; 0 runs ticks back to back
    pub interval_ms: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            toward_fraction: 0.01,
            axis_step: 1,
            start_tick: 0,
            interval_ms: 0,
        }
    }
}

/// Zone engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Seconds before cached hull geometry is rebuilt
    pub hull_cache_ttl_secs: u64,
    /// Distinct vertices considered per hull
    pub max_hull_points: usize,
    /// Barycentric slack for boundary points
    pub boundary_epsilon: f64,
}

impl ZoneConfig {
    pub fn hull_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.hull_cache_ttl_secs)
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            hull_cache_ttl_secs: 300,
            max_hull_points: 16,
            boundary_epsilon: 1e-9,
        }
    }
}

/// Item defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    pub default_claim_radius: f64,
    pub default_reward: i64,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            default_claim_radius: 5.0,
            default_reward: 10,
        }
    }
}

/// Position generator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Server name -> weight category, for directory records without one
    pub origins: BTreeMap<String, WeightCategory>,
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Spectrum Configuration

[keeper]
identity = "keeper@spectrum.local"

[tick]
toward_fraction = 0.01
axis_step = 1
start_tick = 0
interval_ms = 0

[zones]
hull_cache_ttl_secs = 300
max_hull_points = 16
boundary_epsilon = 1e-9

[items]
default_claim_radius = 5.0
default_reward = 10

[generator.origins]
"spectrum.social" = "local"
"neighbor.town" = "neighbor"
"elsewhere.net" = "remote"
"#
    .to_string()
}
