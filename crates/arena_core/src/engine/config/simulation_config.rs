//! Clock and event-rate parameters.

use serde::{Deserialize, Serialize};

use crate::models::MatchKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated seconds per tick (default: 3)
    pub tick_seconds: u32,
    /// Chance that a live tick produces a play (default: 0.3)
    pub event_probability: f64,
    /// Ticks spent in the halftime break before the second half (default: 5)
    pub halftime_break_ticks: u32,
    /// Max duration of an exhibition match in sim-seconds (default: 1800)
    pub exhibition_duration_secs: u32,
    /// Max duration of a league match in sim-seconds (default: 2400)
    pub league_duration_secs: u32,
    /// Ball line a team starts from after receiving a kickoff (default: 25)
    pub kickoff_return_line: i32,
    /// Number of MVP candidates exported with the result (default: 3)
    pub mvp_candidates: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 3,
            event_probability: 0.3,
            halftime_break_ticks: 5,
            exhibition_duration_secs: 1800,
            league_duration_secs: 2400,
            kickoff_return_line: 25,
            mvp_candidates: 3,
        }
    }
}

impl SimulationConfig {
    pub fn max_duration(&self, kind: MatchKind) -> u32 {
        match kind {
            MatchKind::Exhibition => self.exhibition_duration_secs,
            MatchKind::League => self.league_duration_secs,
        }
    }

    pub fn half_duration(&self, kind: MatchKind) -> u32 {
        self.max_duration(kind) / 2
    }
}
