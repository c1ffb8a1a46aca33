use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::player::InjuryState;
use super::team::TeamSide;

/// One narrated action. Immutable once created: the engine builds it
/// completely, applies it to the ledger and only then appends it to the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MatchEvent {
    pub id: Uuid,
    pub match_id: String,
    /// Dense per-match sequence number, starting at 1
    pub sequence: u64,
    pub tick: u64,
    pub clock_secs: u32,
    pub half: u8,
    #[serde(rename = "type")]
    pub category: EventCategory,
    /// Team the primary actor plays for (None for neutral events)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamSide>,
    /// Acting player ids, primary actor first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deltas: Vec<StatDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yards: Option<i32>,
    #[serde(default)]
    pub long_gain: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub injury: Option<InjuryState>,
    pub commentary: String,
    pub pacing: PacingDirective,
    pub timestamp: DateTime<Utc>,
}

/// Event categories in stable declaration order. The order is the
/// tie-break order for weighted selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Kickoff,
    Score,
    PassComplete,
    PassIncomplete,
    Drop,
    Run,
    Tackle,
    Knockdown,
    Interception,
    Fumble,
    FumbleRecovery,
    Injury,
    SkillUse,
    Atmosphere,
    /// Filler emitted when a play cannot be resolved
    GeneralPlay,
    Halftime,
    Fulltime,
}

impl EventCategory {
    pub const ALL: [EventCategory; 17] = [
        EventCategory::Kickoff,
        EventCategory::Score,
        EventCategory::PassComplete,
        EventCategory::PassIncomplete,
        EventCategory::Drop,
        EventCategory::Run,
        EventCategory::Tackle,
        EventCategory::Knockdown,
        EventCategory::Interception,
        EventCategory::Fumble,
        EventCategory::FumbleRecovery,
        EventCategory::Injury,
        EventCategory::SkillUse,
        EventCategory::Atmosphere,
        EventCategory::GeneralPlay,
        EventCategory::Halftime,
        EventCategory::Fulltime,
    ];

    /// Turnovers flip possession as soon as they are emitted.
    pub fn is_turnover(&self) -> bool {
        matches!(self, EventCategory::Interception | EventCategory::FumbleRecovery)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Kickoff => "kickoff",
            EventCategory::Score => "score",
            EventCategory::PassComplete => "pass_complete",
            EventCategory::PassIncomplete => "pass_incomplete",
            EventCategory::Drop => "drop",
            EventCategory::Run => "run",
            EventCategory::Tackle => "tackle",
            EventCategory::Knockdown => "knockdown",
            EventCategory::Interception => "interception",
            EventCategory::Fumble => "fumble",
            EventCategory::FumbleRecovery => "fumble_recovery",
            EventCategory::Injury => "injury",
            EventCategory::SkillUse => "skill_use",
            EventCategory::Atmosphere => "atmosphere",
            EventCategory::GeneralPlay => "general_play",
            EventCategory::Halftime => "halftime",
            EventCategory::Fulltime => "fulltime",
        }
    }
}

/// Counter kinds tracked by the ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    PassAttempts,
    PassCompletions,
    PassingYards,
    Receptions,
    ReceivingYards,
    RushAttempts,
    RushingYards,
    Tackles,
    KnockdownsInflicted,
    KnockedDown,
    Interceptions,
    PassDefenses,
    InterceptionsThrown,
    Drops,
    FumblesForced,
    FumblesLost,
    FumblesRecovered,
    Scores,
    SkillUses,
    InjuriesSustained,
    /// Team-level: points on the board
    TeamScore,
    /// Team-level: possessions given away
    Turnovers,
}

impl StatKind {
    pub fn is_team_stat(&self) -> bool {
        matches!(self, StatKind::TeamScore | StatKind::Turnovers)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum StatTarget {
    Player(String),
    Team(TeamSide),
}

/// A single counter mutation produced by the attribution table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatDelta {
    pub target: StatTarget,
    pub stat: StatKind,
    pub amount: i32,
}

impl StatDelta {
    pub fn player(id: &str, stat: StatKind, amount: i32) -> Self {
        Self { target: StatTarget::Player(id.to_string()), stat, amount }
    }

    pub fn team(side: TeamSide, stat: StatKind, amount: i32) -> Self {
        Self { target: StatTarget::Team(side), stat, amount }
    }
}

/// Presentation priority tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Critical,
    Important,
    Standard,
    Downtime,
}

/// Playback recommendation attached to each event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct PacingDirective {
    pub tier: PriorityTier,
    pub speed_multiplier: f32,
    pub visuals_required: bool,
}

impl MatchEvent {
    pub fn primary_actor(&self) -> Option<&str> {
        self.actors.first().map(String::as_str)
    }

    pub fn secondary_actor(&self) -> Option<&str> {
        self.actors.get(1).map(String::as_str)
    }

    /// Net change for one stat on one target in this event.
    pub fn delta_for(&self, target: &StatTarget, stat: StatKind) -> i32 {
        self.deltas
            .iter()
            .filter(|d| &d.target == target && d.stat == stat)
            .map(|d| d.amount)
            .sum()
    }
}
