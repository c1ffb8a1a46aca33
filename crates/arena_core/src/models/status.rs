use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Match lifecycle. Transitions only move forward; pausing is tracked as a
/// separate flag and never changes the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Created, not kicked off yet
    Preparing,
    FirstHalf,
    /// Half-time break
    Halftime,
    SecondHalf,
    /// Match finished (terminal)
    Completed,
}

impl MatchStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, MatchStatus::FirstHalf | MatchStatus::SecondHalf)
    }

    /// Running from the registry's point of view (ticks still needed).
    pub fn is_running(&self) -> bool {
        matches!(self, MatchStatus::FirstHalf | MatchStatus::Halftime | MatchStatus::SecondHalf)
    }

    pub fn half(&self) -> u8 {
        match self {
            MatchStatus::Preparing | MatchStatus::FirstHalf | MatchStatus::Halftime => 1,
            MatchStatus::SecondHalf | MatchStatus::Completed => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    #[default]
    Exhibition,
    League,
}

impl MatchKind {
    pub fn from_exhibition_flag(is_exhibition: bool) -> Self {
        if is_exhibition {
            MatchKind::Exhibition
        } else {
            MatchKind::League
        }
    }
}
