//! Centralized thresholds for resolution and the performance model.
//!
//! | Threshold | Used by |
//! |-----------|---------|
//! | `knockdown_power_threshold` | Tackle attribution (power hit → knockdown) |
//! | `breakaway_yards` | Long-gain flag on any gain |
//! | `fatigue_stamina_threshold` | Fatigue penalty in the performance model |
//! | `camaraderie_high` / `camaraderie_low` | Team chemistry modifier |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Effective power above which a tackle also counts as a knockdown (default: 30)
    pub knockdown_power_threshold: f32,
    /// Gain (yards) at or above which a play is flagged as a breakaway (default: 12)
    pub breakaway_yards: i32,
    /// Stamina below which fatigue penalties kick in (default: 20)
    pub fatigue_stamina_threshold: f32,
    /// Stamina points per attribute point lost on speed/agility (default: 5)
    pub fatigue_points_per_penalty: f32,
    /// Camaraderie at or above which every attribute gets the bonus (default: 76)
    pub camaraderie_high: u8,
    /// Camaraderie at or below which every attribute gets the penalty (default: 40)
    pub camaraderie_low: u8,
    /// Flat bonus / penalty magnitude (default: 2)
    pub camaraderie_modifier: f32,
    /// Base attribute cap applied at read time (default: 60)
    pub max_attribute: f32,
    /// Headroom above the cap allowed after modifiers (default: 10)
    pub modifier_headroom: f32,
    /// Match progress from which late-match race bonuses apply (default: 0.75)
    pub late_match_progress: f32,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            knockdown_power_threshold: 30.0,
            breakaway_yards: 12,
            fatigue_stamina_threshold: 20.0,
            fatigue_points_per_penalty: 5.0,
            camaraderie_high: 76,
            camaraderie_low: 40,
            camaraderie_modifier: 2.0,
            max_attribute: 60.0,
            modifier_headroom: 10.0,
            late_match_progress: 0.75,
        }
    }
}

impl ThresholdsConfig {
    /// Arcade preset - more breakaways, more knockdowns
    pub fn arcade() -> Self {
        Self { knockdown_power_threshold: 26.0, breakaway_yards: 10, ..Self::default() }
    }

    /// Grind preset - hard-hitting knockdowns are rarer
    pub fn grind() -> Self {
        Self {
            knockdown_power_threshold: 34.0,
            breakaway_yards: 14,
            fatigue_stamina_threshold: 25.0,
            ..Self::default()
        }
    }

    /// Upper clamp for effective attributes.
    pub fn effective_cap(&self) -> f32 {
        self.max_attribute + self.modifier_headroom
    }
}
