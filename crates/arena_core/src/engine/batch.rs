//! Batch simulation across seeds.
//!
//! Runs the same fixture many times (seed `base_seed + index`) and reduces
//! the results to a balance summary. Large batches run on the rayon pool.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::EngineConfig;
use super::match_sim::MatchEngine;
use crate::error::MatchError;
use crate::models::{EventCategory, MatchKind, MatchResult, Team, TeamSide};

/// Batches at or below this size run sequentially.
const PARALLEL_THRESHOLD: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub matches: usize,
    pub home_wins: usize,
    pub away_wins: usize,
    pub draws: usize,
    pub avg_home_score: f32,
    pub avg_away_score: f32,
    pub avg_events: f32,
    pub avg_turnovers: f32,
    pub avg_injuries: f32,
    /// Share of events flagged as long gains
    pub long_gain_rate: f32,
}

impl BatchSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let n = results.len();
        if n == 0 {
            return Self::default();
        }
        let mut summary = Self { matches: n, ..Self::default() };
        let mut events = 0usize;
        let mut long_gains = 0usize;
        for r in results {
            match r.winner {
                Some(TeamSide::Home) => summary.home_wins += 1,
                Some(TeamSide::Away) => summary.away_wins += 1,
                None => summary.draws += 1,
            }
            summary.avg_home_score += r.home_score as f32;
            summary.avg_away_score += r.away_score as f32;
            summary.avg_turnovers += (r.ledger.home.turnovers + r.ledger.away.turnovers) as f32;
            summary.avg_injuries += r.count(EventCategory::Injury) as f32;
            events += r.events.len();
            long_gains += r.events.iter().filter(|e| e.long_gain).count();
        }
        let n = n as f32;
        summary.avg_home_score /= n;
        summary.avg_away_score /= n;
        summary.avg_turnovers /= n;
        summary.avg_injuries /= n;
        summary.avg_events = events as f32 / n;
        summary.long_gain_rate = if events == 0 { 0.0 } else { long_gains as f32 / events as f32 };
        summary
    }

    pub fn home_win_rate(&self) -> f32 {
        if self.matches == 0 {
            return 0.0;
        }
        self.home_wins as f32 / self.matches as f32
    }
}

fn simulate_one(
    home: &Team,
    away: &Team,
    kind: MatchKind,
    config: &EngineConfig,
    seed: u64,
) -> Result<MatchResult, MatchError> {
    let mut engine = MatchEngine::new(format!("batch-{seed}"), home.clone(), away.clone(), kind, config.clone(), Some(seed))?;
    Ok(engine.run_to_completion())
}

/// Simulates `count` matches. Results come back in seed order regardless of
/// how they were scheduled.
pub fn simulate_many(
    home: &Team,
    away: &Team,
    kind: MatchKind,
    config: &EngineConfig,
    base_seed: u64,
    count: usize,
) -> Result<Vec<MatchResult>, MatchError> {
    info!(count, base_seed, "running batch simulation");
    let seeds: Vec<u64> = (0..count as u64).map(|i| base_seed.wrapping_add(i)).collect();
    if seeds.len() > PARALLEL_THRESHOLD {
        seeds.par_iter().map(|seed| simulate_one(home, away, kind, config, *seed)).collect()
    } else {
        seeds.iter().map(|seed| simulate_one(home, away, kind, config, *seed)).collect()
    }
}

pub fn summarize_many(
    home: &Team,
    away: &Team,
    kind: MatchKind,
    config: &EngineConfig,
    base_seed: u64,
    count: usize,
) -> Result<BatchSummary, MatchError> {
    let results = simulate_many(home, away, kind, config, base_seed, count)?;
    Ok(BatchSummary::from_results(&results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::demo_pair;

    #[test]
    fn test_parallel_matches_sequential() {
        let (home, away) = demo_pair();
        let config = EngineConfig::default();
        let many = simulate_many(&home, &away, MatchKind::Exhibition, &config, 100, 12).unwrap();
        assert_eq!(many.len(), 12);
        for (idx, result) in many.iter().enumerate() {
            let single = simulate_many(&home, &away, MatchKind::Exhibition, &config, 100 + idx as u64, 1).unwrap();
            assert_eq!(result.home_score, single[0].home_score);
            assert_eq!(result.events.len(), single[0].events.len());
        }
    }

    #[test]
    fn test_summary_counts_add_up() {
        let (home, away) = demo_pair();
        let summary = summarize_many(&home, &away, MatchKind::Exhibition, &EngineConfig::default(), 7, 10).unwrap();
        assert_eq!(summary.matches, 10);
        assert_eq!(summary.home_wins + summary.away_wins + summary.draws, 10);
        assert!(summary.avg_events > 2.0);
        assert!((0.0..=1.0).contains(&summary.home_win_rate()));
    }

    #[test]
    fn test_invalid_roster_fails_batch() {
        let (mut home, away) = demo_pair();
        home.players.clear();
        assert!(simulate_many(&home, &away, MatchKind::Exhibition, &EngineConfig::default(), 1, 3).is_err());
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(BatchSummary::from_results(&[]), BatchSummary::default());
    }
}
