//! Stamina Configuration

use serde::{Deserialize, Serialize};

/// Stamina drain, action costs and race regeneration parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StaminaConfig {
    // === Drain ===
    /// Base drain per live tick for every fielded player (default: 0.12)
    pub base_drain_per_tick: f32,
    /// How much a high stamina attribute slows the drain (default: 0.5)
    pub stamina_attr_impact: f32,

    // === Action Costs ===
    /// Pass stamina cost (default: 1.0)
    pub pass_cost: f32,
    /// Carry / run stamina cost (default: 2.5)
    pub run_cost: f32,
    /// Tackle / block stamina cost (default: 3.0)
    pub hit_cost: f32,
    /// Stamina lost by a player knocked down (default: 6.0)
    pub knocked_down_cost: f32,

    // === Recovery ===
    /// Stamina restored to every player at halftime (default: 25.0)
    pub halftime_recovery: f32,
    /// Stamina restored to a player using a skill (default: 6.0)
    pub skill_recovery: f32,

    // === Race Effects ===
    /// Sylvan per-tick regeneration chance (default: 0.15)
    pub sylvan_regen_chance: f64,
    /// Sylvan regeneration amount (default: 2.0)
    pub sylvan_regen_amount: f32,
    /// Lumina per-tick team-wide restoration chance (default: 0.01)
    pub lumina_radiance_chance: f64,
    /// Lumina restoration amount per teammate (default: 5.0)
    pub lumina_radiance_amount: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            base_drain_per_tick: 0.12,
            stamina_attr_impact: 0.5,

            pass_cost: 1.0,
            run_cost: 2.5,
            hit_cost: 3.0,
            knocked_down_cost: 6.0,

            halftime_recovery: 25.0,
            skill_recovery: 6.0,

            sylvan_regen_chance: 0.15,
            sylvan_regen_amount: 2.0,
            lumina_radiance_chance: 0.01,
            lumina_radiance_amount: 5.0,
        }
    }
}
