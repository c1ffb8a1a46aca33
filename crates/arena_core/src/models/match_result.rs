use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::events::{EventCategory, MatchEvent};
use super::ledger::StatLedger;
use super::status::MatchKind;
use super::team::TeamSide;

/// Final export handed to the persistence hook once a match completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MatchResult {
    pub match_id: String,
    pub kind: MatchKind,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    /// None on a draw
    pub winner: Option<TeamSide>,
    pub ledger: StatLedger,
    pub events: Vec<MatchEvent>,
    pub mvp_candidates: Vec<MvpCandidate>,
    /// Set when the match was stopped before the clock ran out
    #[serde(default)]
    pub terminated_early: bool,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MvpCandidate {
    pub player_id: String,
    pub name: String,
    pub side: TeamSide,
    pub impact: f32,
}

impl MatchResult {
    pub fn count(&self, category: EventCategory) -> usize {
        self.events.iter().filter(|e| e.category == category).count()
    }

    pub fn summary_line(&self) -> String {
        let outcome = match self.winner {
            Some(TeamSide::Home) => format!("{} win", self.home_team),
            Some(TeamSide::Away) => format!("{} win", self.away_team),
            None => "draw".to_string(),
        };
        format!(
            "{} {} - {} {} ({})",
            self.home_team, self.home_score, self.away_score, self.away_team, outcome
        )
    }
}

/// Top `limit` players by impact score.
pub fn mvp_candidates(ledger: &StatLedger, limit: usize) -> Vec<MvpCandidate> {
    ledger
        .ranked_by_impact()
        .into_iter()
        .take(limit)
        .filter_map(|(id, impact)| {
            ledger.players.get(&id).map(|line| MvpCandidate {
                player_id: id.clone(),
                name: line.name.clone(),
                side: line.side,
                impact,
            })
        })
        .collect()
}

pub fn winner_of(home_score: u32, away_score: u32) -> Option<TeamSide> {
    match home_score.cmp(&away_score) {
        std::cmp::Ordering::Greater => Some(TeamSide::Home),
        std::cmp::Ordering::Less => Some(TeamSide::Away),
        std::cmp::Ordering::Equal => None,
    }
}
