//! Base weights for the per-tick play-call draw.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayWeights {
    pub pass: f32,
    pub run: f32,
    pub block: f32,
    pub skill_use: f32,
    pub atmosphere: f32,
    pub injury: f32,
    /// Extra run weight once the offense is inside the red zone (default: 12)
    pub red_zone_run_bonus: f32,
    /// Extra pass weight while pinned deep in own half (default: 10)
    pub deep_pass_bonus: f32,
    /// Red zone starts at this ball line (default: 80)
    pub red_zone_line: i32,
    /// Deep own half ends at this ball line (default: 30)
    pub deep_line: i32,

    // === Resolution probabilities ===
    /// Base completion chance before skill differences (default: 0.55)
    pub pass_base_completion: f32,
    /// Base interception chance (default: 0.04)
    pub pass_base_interception: f32,
    /// Base fumble chance on a tackle (default: 0.03)
    pub fumble_base_chance: f32,
    /// Chance a completed pass ends in a tackle event (default: 0.6)
    pub tackle_after_catch_chance: f64,
    /// Chance a power hit causes an injury (default: 0.08)
    pub injury_on_power_hit_chance: f64,
}

impl Default for PlayWeights {
    fn default() -> Self {
        Self {
            pass: 32.0,
            run: 32.0,
            block: 12.0,
            skill_use: 5.0,
            atmosphere: 10.0,
            injury: 2.0,
            red_zone_run_bonus: 12.0,
            deep_pass_bonus: 10.0,
            red_zone_line: 80,
            deep_line: 30,
            pass_base_completion: 0.55,
            pass_base_interception: 0.04,
            fumble_base_chance: 0.03,
            tackle_after_catch_chance: 0.6,
            injury_on_power_hit_chance: 0.08,
        }
    }
}
