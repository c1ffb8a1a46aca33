use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::events::MatchEvent;
use super::ledger::StatLedger;
use super::player::{FieldPosition, InjuryState, Race, Role};
use super::status::{MatchKind, MatchStatus};
use super::team::{Formation, Team, TeamSide};

/// Full read-only copy of a match at one point in time.
///
/// Every event a subscriber receives after this snapshot has
/// `sequence > last_sequence`; replaying them onto `ledger` yields the live
/// ledger without double counting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MatchSnapshot {
    pub match_id: String,
    pub kind: MatchKind,
    pub status: MatchStatus,
    pub paused: bool,
    pub tick: u64,
    pub clock_secs: u32,
    pub max_duration_secs: u32,
    pub half: u8,
    pub possession: TeamSide,
    /// Ball line for the team in possession (0 = own goal line, 100 = scoring)
    pub ball_line: i32,
    pub home: TeamView,
    pub away: TeamView,
    pub ledger: StatLedger,
    pub last_sequence: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct TeamView {
    pub id: String,
    pub name: String,
    pub formation: Formation,
    pub camaraderie: u8,
    pub score: u32,
    pub players: Vec<PlayerView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub race: Race,
    pub role: Role,
    pub stamina: f32,
    pub max_stamina: f32,
    pub injury: InjuryState,
    pub position: FieldPosition,
}

impl TeamView {
    pub fn from_team(team: &Team, score: u32) -> Self {
        Self {
            id: team.id.clone(),
            name: team.name.clone(),
            formation: team.formation,
            camaraderie: team.camaraderie,
            score,
            players: team
                .players
                .iter()
                .map(|p| PlayerView {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    race: p.race,
                    role: p.role,
                    stamina: p.stamina(),
                    max_stamina: p.max_stamina(),
                    injury: p.injury,
                    position: p.position,
                })
                .collect(),
        }
    }
}

impl MatchSnapshot {
    pub fn score(&self) -> (u32, u32) {
        (self.home.score, self.away.score)
    }

    /// Folds later events onto this snapshot's ledger, skipping anything the
    /// snapshot already reflects.
    pub fn replay<'a>(&self, events: impl IntoIterator<Item = &'a MatchEvent>) -> StatLedger {
        let mut ledger = self.ledger.clone();
        ledger.frozen = false;
        for event in events.into_iter().filter(|e| e.sequence > self.last_sequence) {
            // replayed deltas came from a ledger that accepted them
            let _ = ledger.apply_event(event);
        }
        ledger
    }
}
