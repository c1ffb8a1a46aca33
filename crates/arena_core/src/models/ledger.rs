//! Stat ledger: per-player and per-team counters.
//!
//! The ledger is only ever mutated through [`StatLedger::apply_event`], which
//! applies the deltas the attribution table put on the event. Possession
//! ticks are the one exception: they are sampled by the generator once per
//! live tick and are not part of any event.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::events::{MatchEvent, StatDelta, StatKind, StatTarget};
use super::team::{Team, TeamSide};
use crate::error::LedgerError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerStats {
    pub pass_attempts: u32,
    pub pass_completions: u32,
    pub passing_yards: i32,
    pub receptions: u32,
    pub receiving_yards: i32,
    pub rush_attempts: u32,
    pub rushing_yards: i32,
    pub tackles: u32,
    pub knockdowns_inflicted: u32,
    pub knocked_down: u32,
    pub interceptions: u32,
    pub pass_defenses: u32,
    pub interceptions_thrown: u32,
    pub drops: u32,
    pub fumbles_forced: u32,
    pub fumbles_lost: u32,
    pub fumbles_recovered: u32,
    pub scores: u32,
    pub skill_uses: u32,
    pub injuries_sustained: u32,
}

impl PlayerStats {
    fn apply(&mut self, stat: StatKind, amount: i32) {
        let counter = match stat {
            StatKind::PassAttempts => &mut self.pass_attempts,
            StatKind::PassCompletions => &mut self.pass_completions,
            StatKind::Receptions => &mut self.receptions,
            StatKind::RushAttempts => &mut self.rush_attempts,
            StatKind::Tackles => &mut self.tackles,
            StatKind::KnockdownsInflicted => &mut self.knockdowns_inflicted,
            StatKind::KnockedDown => &mut self.knocked_down,
            StatKind::Interceptions => &mut self.interceptions,
            StatKind::PassDefenses => &mut self.pass_defenses,
            StatKind::InterceptionsThrown => &mut self.interceptions_thrown,
            StatKind::Drops => &mut self.drops,
            StatKind::FumblesForced => &mut self.fumbles_forced,
            StatKind::FumblesLost => &mut self.fumbles_lost,
            StatKind::FumblesRecovered => &mut self.fumbles_recovered,
            StatKind::Scores => &mut self.scores,
            StatKind::SkillUses => &mut self.skill_uses,
            StatKind::InjuriesSustained => &mut self.injuries_sustained,
            StatKind::PassingYards => {
                self.passing_yards = self.passing_yards.saturating_add(amount);
                return;
            }
            StatKind::ReceivingYards => {
                self.receiving_yards = self.receiving_yards.saturating_add(amount);
                return;
            }
            StatKind::RushingYards => {
                self.rushing_yards = self.rushing_yards.saturating_add(amount);
                return;
            }
            // team stats never target a player (checked by the caller)
            StatKind::TeamScore | StatKind::Turnovers => return,
        };
        *counter = counter.saturating_add_signed(amount);
    }

    fn accumulate(&mut self, other: &PlayerStats) {
        self.pass_attempts += other.pass_attempts;
        self.pass_completions += other.pass_completions;
        self.passing_yards += other.passing_yards;
        self.receptions += other.receptions;
        self.receiving_yards += other.receiving_yards;
        self.rush_attempts += other.rush_attempts;
        self.rushing_yards += other.rushing_yards;
        self.tackles += other.tackles;
        self.knockdowns_inflicted += other.knockdowns_inflicted;
        self.knocked_down += other.knocked_down;
        self.interceptions += other.interceptions;
        self.pass_defenses += other.pass_defenses;
        self.interceptions_thrown += other.interceptions_thrown;
        self.drops += other.drops;
        self.fumbles_forced += other.fumbles_forced;
        self.fumbles_lost += other.fumbles_lost;
        self.fumbles_recovered += other.fumbles_recovered;
        self.scores += other.scores;
        self.skill_uses += other.skill_uses;
        self.injuries_sustained += other.injuries_sustained;
    }

    /// Weighted stat score used to rank MVP candidates.
    pub fn impact_score(&self) -> f32 {
        self.scores as f32 * 6.0
            + self.passing_yards as f32 * 0.04
            + (self.rushing_yards + self.receiving_yards) as f32 * 0.1
            + self.pass_completions as f32 * 0.3
            + self.tackles as f32
            + self.knockdowns_inflicted as f32 * 1.5
            + self.interceptions as f32 * 4.0
            + self.fumbles_forced as f32 * 3.0
            + self.fumbles_recovered as f32 * 3.0
            + self.skill_uses as f32 * 0.5
            - self.fumbles_lost as f32 * 3.0
            - self.interceptions_thrown as f32 * 3.0
            - self.drops as f32
    }

    pub fn completion_rate(&self) -> f32 {
        if self.pass_attempts == 0 {
            return 0.0;
        }
        self.pass_completions as f32 / self.pass_attempts as f32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TeamStats {
    pub score: u32,
    pub turnovers: u32,
    pub possession_ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerLine {
    pub side: TeamSide,
    pub name: String,
    pub stats: PlayerStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatLedger {
    pub players: BTreeMap<String, PlayerLine>,
    pub home: TeamStats,
    pub away: TeamStats,
    pub frozen: bool,
}

impl StatLedger {
    /// Zeroed ledger covering both rosters.
    pub fn new(home: &Team, away: &Team) -> Self {
        let mut players = BTreeMap::new();
        for (side, team) in [(TeamSide::Home, home), (TeamSide::Away, away)] {
            for player in &team.players {
                players.insert(
                    player.id.clone(),
                    PlayerLine { side, name: player.name.clone(), stats: PlayerStats::default() },
                );
            }
        }
        Self { players, home: TeamStats::default(), away: TeamStats::default(), frozen: false }
    }

    /// Applies every delta on the event. All targets are checked first, so a
    /// rejected event leaves the ledger untouched.
    pub fn apply_event(&mut self, event: &MatchEvent) -> Result<(), LedgerError> {
        self.apply_deltas(&event.deltas)
    }

    pub fn apply_deltas(&mut self, deltas: &[StatDelta]) -> Result<(), LedgerError> {
        if self.frozen {
            return Err(LedgerError::Frozen);
        }
        for delta in deltas {
            if let StatTarget::Player(id) = &delta.target {
                if !self.players.contains_key(id) || delta.stat.is_team_stat() {
                    return Err(LedgerError::UnknownPlayer(id.clone()));
                }
            }
        }

        for delta in deltas {
            match &delta.target {
                StatTarget::Player(id) => {
                    if let Some(line) = self.players.get_mut(id) {
                        line.stats.apply(delta.stat, delta.amount);
                    }
                }
                StatTarget::Team(side) => {
                    let team = self.team_mut(*side);
                    match delta.stat {
                        StatKind::TeamScore => {
                            team.score = team.score.saturating_add_signed(delta.amount)
                        }
                        StatKind::Turnovers => {
                            team.turnovers = team.turnovers.saturating_add_signed(delta.amount)
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    pub fn record_possession_tick(&mut self, side: TeamSide) {
        if self.frozen {
            return;
        }
        self.team_mut(side).possession_ticks += 1;
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn team(&self, side: TeamSide) -> &TeamStats {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    fn team_mut(&mut self, side: TeamSide) -> &mut TeamStats {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    pub fn score(&self) -> (u32, u32) {
        (self.home.score, self.away.score)
    }

    pub fn player(&self, id: &str) -> Option<&PlayerStats> {
        self.players.get(id).map(|line| &line.stats)
    }

    /// Sum of every player line on one side.
    pub fn team_totals(&self, side: TeamSide) -> PlayerStats {
        let mut totals = PlayerStats::default();
        for line in self.players.values().filter(|l| l.side == side) {
            totals.accumulate(&line.stats);
        }
        totals
    }

    /// Share of possession ticks held by `side` (0.5 before any tick).
    pub fn possession_share(&self, side: TeamSide) -> f32 {
        let total = self.home.possession_ticks + self.away.possession_ticks;
        if total == 0 {
            return 0.5;
        }
        self.team(side).possession_ticks as f32 / total as f32
    }

    /// Player ids ranked by impact score, best first. Ties keep id order.
    pub fn ranked_by_impact(&self) -> Vec<(String, f32)> {
        let mut ranked: Vec<(String, f32)> = self
            .players
            .iter()
            .map(|(id, line)| (id.clone(), line.stats.impact_score()))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}
