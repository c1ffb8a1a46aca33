//! # Engine Configuration Module
//!
//! Every tuning constant of the simulation lives here.
//!
//! ## Usage
//! ```rust
//! use arena_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let arcade = EngineConfig::arcade();
//! assert!(arcade.simulation.event_probability > config.simulation.event_probability);
//! ```
//!
//! ## Environment Variables
//!
//! - `ARENA_CONFIG_PROFILE`: Select preset (arcade, grind, standard)

mod commentary_config;
mod simulation_config;
mod stamina_config;
mod thresholds_config;
mod weights_config;

pub use commentary_config::CommentaryConfig;
pub use simulation_config::SimulationConfig;
pub use stamina_config::StaminaConfig;
pub use thresholds_config::ThresholdsConfig;
pub use weights_config::PlayWeights;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub thresholds: ThresholdsConfig,
    pub stamina: StaminaConfig,
    pub weights: PlayWeights,
    pub commentary: CommentaryConfig,
}

impl EngineConfig {
    /// Balanced default
    pub fn standard() -> Self {
        Self::default()
    }

    /// More plays, more breakaways, more scoring
    pub fn arcade() -> Self {
        let mut cfg = Self::default();
        cfg.simulation.event_probability = 0.45;
        cfg.weights.pass_base_completion = 0.62;
        cfg.weights.atmosphere = 6.0;
        cfg.thresholds = ThresholdsConfig::arcade();
        cfg
    }

    /// Fewer plays, heavier fatigue, more turnovers
    pub fn grind() -> Self {
        let mut cfg = Self::default();
        cfg.simulation.event_probability = 0.25;
        cfg.stamina.base_drain_per_tick = 0.18;
        cfg.weights.run = 38.0;
        cfg.weights.fumble_base_chance = 0.05;
        cfg.thresholds = ThresholdsConfig::grind();
        cfg
    }

    pub fn from_profile(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" | "default" => Some(Self::standard()),
            "arcade" => Some(Self::arcade()),
            "grind" => Some(Self::grind()),
            _ => None,
        }
    }

    /// Load from environment variable ARENA_CONFIG_PROFILE or use default
    pub fn from_env_or_default() -> Self {
        std::env::var("ARENA_CONFIG_PROFILE")
            .ok()
            .and_then(|name| Self::from_profile(&name))
            .unwrap_or_default()
    }

    /// Parses a (possibly partial) YAML document; missing keys keep defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.tick_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "simulation.tick_seconds",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&sim.event_probability) {
            return Err(ConfigError::Invalid {
                field: "simulation.event_probability",
                reason: format!("{} outside 0..=1", sim.event_probability),
            });
        }
        if sim.exhibition_duration_secs < 2 * sim.tick_seconds
            || sim.league_duration_secs < 2 * sim.tick_seconds
        {
            return Err(ConfigError::Invalid {
                field: "simulation.*_duration_secs",
                reason: "must cover at least one tick per half".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.commentary.race_flavor_probability) {
            return Err(ConfigError::Invalid {
                field: "commentary.race_flavor_probability",
                reason: format!("{} outside 0..=1", self.commentary.race_flavor_probability),
            });
        }
        let w = &self.weights;
        let total = w.pass + w.run + w.block + w.skill_use + w.atmosphere + w.injury;
        if !total.is_finite() || total <= 0.0 || [w.pass, w.run, w.block, w.skill_use, w.atmosphere, w.injury].iter().any(|v| *v < 0.0) {
            return Err(ConfigError::Invalid {
                field: "weights",
                reason: "weights must be non-negative with a positive sum".to_string(),
            });
        }
        if self.thresholds.camaraderie_low >= self.thresholds.camaraderie_high {
            return Err(ConfigError::Invalid {
                field: "thresholds.camaraderie_low",
                reason: "must be below camaraderie_high".to_string(),
            });
        }
        Ok(())
    }
}

// ========== Tests ==========
