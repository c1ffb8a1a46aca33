//! Weighted choices: play calls and participants.
//!
//! Every draw walks its table in a stable order. A roll landing exactly on a
//! boundary resolves to the earlier entry; zero or non-finite weights never
//! win.

use rand::Rng;

use crate::engine::config::PlayWeights;
use crate::models::{Player, Role, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayCall {
    Pass,
    Run,
    Block,
    SkillUse,
    Atmosphere,
    Injury,
}

impl PlayCall {
    pub const ALL: [PlayCall; 6] = [
        PlayCall::Pass,
        PlayCall::Run,
        PlayCall::Block,
        PlayCall::SkillUse,
        PlayCall::Atmosphere,
        PlayCall::Injury,
    ];
}

fn usable(weight: f32) -> bool {
    weight.is_finite() && weight > 0.0
}

/// Index hit by `roll` in `0..=sum(weights)`.
pub fn pick_by_roll(weights: &[f32], roll: f32) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last = None;
    for (idx, weight) in weights.iter().copied().enumerate() {
        if !usable(weight) {
            continue;
        }
        cumulative += weight;
        last = Some(idx);
        if roll <= cumulative {
            return Some(idx);
        }
    }
    // float drift past the final boundary
    last
}

pub fn weighted_index<R: Rng>(weights: &[f32], rng: &mut R) -> Option<usize> {
    let total: f32 = weights.iter().copied().filter(|w| usable(*w)).sum();
    if total <= 0.0 {
        return None;
    }
    let roll = rng.gen::<f32>() * total;
    pick_by_roll(weights, roll)
}

/// Play-call weights for the team in possession at `ball_line`.
pub fn play_call_weights(weights: &PlayWeights, ball_line: i32) -> [f32; 6] {
    let mut pass = weights.pass;
    let mut run = weights.run;
    if ball_line >= weights.red_zone_line {
        run += weights.red_zone_run_bonus;
    }
    if ball_line <= weights.deep_line {
        pass += weights.deep_pass_bonus;
    }
    [pass, run, weights.block, weights.skill_use, weights.atmosphere, weights.injury]
}

pub fn draw_play_call<R: Rng>(weights: &PlayWeights, ball_line: i32, rng: &mut R) -> PlayCall {
    let table = play_call_weights(weights, ball_line);
    weighted_index(&table, rng)
        .map(|idx| PlayCall::ALL[idx])
        .unwrap_or(PlayCall::Atmosphere)
}

// ============================================================================
// Participants
// ============================================================================

/// Available players from the first role tier that has any, roster order
/// preserved. Falls back to every available player.
pub fn by_preference<'a>(team: &'a Team, tiers: &[&[Role]], exclude: Option<&str>) -> Vec<&'a Player> {
    let eligible = |p: &&Player| p.is_available() && Some(p.id.as_str()) != exclude;
    for tier in tiers {
        let found: Vec<&Player> = team.players.iter().filter(eligible).filter(|p| tier.contains(&p.role)).collect();
        if !found.is_empty() {
            return found;
        }
    }
    team.players.iter().filter(eligible).collect()
}

pub fn passers(team: &Team) -> Vec<&Player> {
    by_preference(team, &[&[Role::Passer], &[Role::Wildcard]], None)
}

pub fn receivers<'a>(team: &'a Team, passer: &str) -> Vec<&'a Player> {
    by_preference(team, &[&[Role::Runner, Role::Wildcard]], Some(passer))
}

pub fn carriers(team: &Team) -> Vec<&Player> {
    by_preference(team, &[&[Role::Runner], &[Role::Wildcard]], None)
}

pub fn hitters(team: &Team) -> Vec<&Player> {
    by_preference(team, &[&[Role::Blocker], &[Role::Wildcard]], None)
}

pub fn anyone(team: &Team) -> Vec<&Player> {
    by_preference(team, &[], None)
}

/// Weighted pick among `candidates`. Every candidate keeps a small floor
/// weight so nobody is locked out entirely.
pub fn pick_player<'a, R: Rng>(
    candidates: &[&'a Player],
    weight: impl Fn(&Player) -> f32,
    rng: &mut R,
) -> Option<&'a Player> {
    let weights: Vec<f32> = candidates.iter().map(|p| weight(p).max(0.01)).collect();
    weighted_index(&weights, rng).map(|idx| candidates[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::demo_team;
    use crate::models::InjuryState;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_boundary_roll_resolves_to_earlier_entry() {
        let weights = [2.0, 3.0, 5.0];
        assert_eq!(pick_by_roll(&weights, 0.0), Some(0));
        assert_eq!(pick_by_roll(&weights, 2.0), Some(0));
        assert_eq!(pick_by_roll(&weights, 2.0001), Some(1));
        assert_eq!(pick_by_roll(&weights, 5.0), Some(1));
        assert_eq!(pick_by_roll(&weights, 10.0), Some(2));
    }

    #[test]
    fn test_zero_weights_never_win() {
        let weights = [0.0, 4.0, 0.0, f32::NAN, 1.0];
        assert_eq!(pick_by_roll(&weights, 0.0), Some(1));
        assert_eq!(pick_by_roll(&weights, 4.0), Some(1));
        assert_eq!(pick_by_roll(&weights, 4.5), Some(4));
        assert_eq!(pick_by_roll(&[0.0, 0.0], 0.0), None);
    }

    #[test]
    fn test_red_zone_and_deep_bonuses() {
        let w = PlayWeights::default();
        let mid = play_call_weights(&w, 50);
        let red = play_call_weights(&w, 85);
        let deep = play_call_weights(&w, 10);
        assert!(red[1] > mid[1]);
        assert!(deep[0] > mid[0]);
        assert_eq!(mid[2], w.block);
    }

    #[test]
    fn test_preference_skips_injured_and_excluded() {
        let mut team = demo_team("t", "T", 0);
        for p in team.players.iter_mut().filter(|p| p.role == Role::Runner) {
            p.injury = InjuryState::Severe;
        }
        let carriers = carriers(&team);
        assert_eq!(carriers.len(), 1);
        assert_eq!(carriers[0].role, Role::Wildcard);

        let receivers = receivers(&team, "t-wildcard");
        assert!(receivers.iter().all(|p| p.id != "t-wildcard" && p.is_available()));
        assert!(!receivers.is_empty());
    }

    #[test]
    fn test_empty_team_yields_no_pick() {
        let mut team = demo_team("t", "T", 0);
        for p in team.players.iter_mut() {
            p.injury = InjuryState::Severe;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(pick_player(&anyone(&team), |_| 1.0, &mut rng).is_none());
    }

    proptest! {
        #[test]
        fn prop_weighted_index_hits_positive_entry(
            weights in proptest::collection::vec(0.0f32..10.0, 1..8),
            seed in any::<u64>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            match weighted_index(&weights, &mut rng) {
                Some(idx) => prop_assert!(weights[idx] > 0.0),
                None => prop_assert!(weights.iter().all(|w| *w <= 0.0)),
            }
        }
    }
}
