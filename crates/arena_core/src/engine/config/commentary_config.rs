use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommentaryConfig {
    /// Chance of a race-flavored line when the actor's race has a pool (default: 0.30)
    pub race_flavor_probability: f64,
}

impl Default for CommentaryConfig {
    fn default() -> Self {
        Self { race_flavor_probability: 0.30 }
    }
}
