//! Resolved-but-not-yet-emitted event.

use crate::models::{EventCategory, InjuryState, TeamSide};

/// What the resolver decided happened. The generator turns a draft into an
/// immutable [`crate::models::MatchEvent`] by running it through
/// attribution, the ledger, commentary and pacing.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub category: EventCategory,
    /// Team of the primary actor
    pub team: Option<TeamSide>,
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub yards: Option<i32>,
    pub long_gain: bool,
    /// Primary actor's effective power exceeded the knockdown threshold
    pub power_hit: bool,
    pub injury: Option<InjuryState>,
    pub skill: Option<&'static str>,
}

impl EventDraft {
    pub fn new(category: EventCategory) -> Self {
        Self {
            category,
            team: None,
            primary: None,
            secondary: None,
            yards: None,
            long_gain: false,
            power_hit: false,
            injury: None,
            skill: None,
        }
    }

    pub fn team(mut self, side: TeamSide) -> Self {
        self.team = Some(side);
        self
    }

    pub fn primary(mut self, id: impl Into<String>) -> Self {
        self.primary = Some(id.into());
        self
    }

    pub fn secondary(mut self, id: impl Into<String>) -> Self {
        self.secondary = Some(id.into());
        self
    }

    pub fn yards(mut self, yards: i32) -> Self {
        self.yards = Some(yards);
        self
    }

    pub fn long_gain(mut self, long_gain: bool) -> Self {
        self.long_gain = long_gain;
        self
    }

    pub fn power_hit(mut self, power_hit: bool) -> Self {
        self.power_hit = power_hit;
        self
    }

    pub fn injury(mut self, severity: InjuryState) -> Self {
        self.injury = Some(severity);
        self
    }

    pub fn skill(mut self, name: &'static str) -> Self {
        self.skill = Some(name);
        self
    }

    /// Filler used whenever a play cannot be resolved.
    pub fn general_play(team: Option<TeamSide>) -> Self {
        Self { team, ..Self::new(EventCategory::GeneralPlay) }
    }

    pub fn actors(&self) -> Vec<String> {
        self.primary.iter().chain(self.secondary.iter()).cloned().collect()
    }
}
