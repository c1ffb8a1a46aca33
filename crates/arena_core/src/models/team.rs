use super::player::{Player, Role};
use crate::error::MatchError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub formation: Formation,
    pub players: Vec<Player>, // fielded players, fixed size per formation
    /// Team chemistry (0-100)
    #[serde(default = "default_camaraderie")]
    pub camaraderie: u8,
}

fn default_camaraderie() -> u8 {
    50
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Formation {
    /// 1 passer, 2 runners, 2 blockers, 1 wildcard
    #[default]
    Standard,
    /// 1 passer, 1 runner, 3 blockers, 1 wildcard
    Power,
    /// 1 passer, 3 runners, 1 blocker, 1 wildcard
    Spread,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(&self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn is_home(&self) -> bool {
        matches!(self, TeamSide::Home)
    }
}

impl Formation {
    /// Returns (passers, runners, blockers, wildcards)
    pub fn role_counts(&self) -> (usize, usize, usize, usize) {
        match self {
            Formation::Standard => (1, 2, 2, 1),
            Formation::Power => (1, 1, 3, 1),
            Formation::Spread => (1, 3, 1, 1),
        }
    }

    pub fn roster_size(&self) -> usize {
        let (p, r, b, w) = self.role_counts();
        p + r + b + w
    }

    pub fn required(&self, role: Role) -> usize {
        let (p, r, b, w) = self.role_counts();
        match role {
            Role::Passer => p,
            Role::Runner => r,
            Role::Blocker => b,
            Role::Wildcard => w,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Formation::Standard => "1-2-2-1",
            Formation::Power => "1-1-3-1",
            Formation::Spread => "1-3-1-1",
        }
    }
}

impl Team {
    /// Input validation at match creation: roster size, role counts per
    /// formation, attribute ranges, unique ids and camaraderie range.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.name.trim().is_empty() {
            return Err(MatchError::InvalidTeam {
                team: self.id.clone(),
                reason: "name must not be empty".to_string(),
            });
        }
        if self.camaraderie > 100 {
            return Err(MatchError::InvalidTeam {
                team: self.name.clone(),
                reason: format!("camaraderie {} outside 0..=100", self.camaraderie),
            });
        }

        let expected = self.formation.roster_size();
        if self.players.len() != expected {
            return Err(MatchError::InvalidTeamSize {
                team: self.name.clone(),
                expected,
                found: self.players.len(),
            });
        }

        for role in Role::ALL {
            let found = self.players.iter().filter(|p| p.role == role).count();
            let needed = self.formation.required(role);
            if found != needed {
                return Err(MatchError::FormationMismatch {
                    team: self.name.clone(),
                    formation: self.formation.code().to_string(),
                    role: role.name().to_string(),
                    expected: needed,
                    found,
                });
            }
        }

        let mut seen = HashSet::new();
        for player in &self.players {
            if let Err(errors) = player.validate() {
                return Err(MatchError::InvalidPlayer {
                    player: player.id.clone(),
                    reason: errors.to_string(),
                });
            }
            if let Err(reason) = player.check_match_state() {
                return Err(MatchError::InvalidPlayer { player: player.id.clone(), reason });
            }
            if !seen.insert(player.id.as_str()) {
                return Err(MatchError::DuplicatePlayer(player.id.clone()));
            }
        }

        Ok(())
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn available(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_available())
    }

    pub fn available_with_role(&self, role: Role) -> impl Iterator<Item = &Player> {
        self.available().filter(move |p| p.role == role)
    }

    pub fn average_stamina(&self) -> f32 {
        if self.players.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.players.iter().map(|p| p.stamina()).sum();
        sum / self.players.len() as f32
    }
}
