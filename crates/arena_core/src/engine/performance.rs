//! Attribute & performance model.
//!
//! All attribute reads go through [`effective_attribute`], a pure function of
//! the player, the attribute and a [`PerformanceContext`]. The probabilistic
//! race effects (regeneration, radiance) are resolved once per tick by
//! [`apply_tick_race_effects`] before any attribute query of that tick.

use rand::Rng;

use super::config::{StaminaConfig, ThresholdsConfig};
use crate::models::{Attribute, Player, Race, Team};

// ============================================================================
// Race table
// ============================================================================

/// Per-tick special effect of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceTickEffect {
    None,
    /// Chance to regain a little stamina every tick
    Regeneration,
    /// Small chance to restore stamina to the whole team
    Radiance,
}

#[derive(Debug)]
pub struct RaceProfile {
    pub race: Race,
    /// Flat modifiers always in effect
    pub modifiers: &'static [(Attribute, f32)],
    /// Extra modifiers once the match is late (see `late_match_progress`)
    pub late_match: &'static [(Attribute, f32)],
    pub tick_effect: RaceTickEffect,
    /// Name used in skill-use commentary
    pub signature_skill: &'static str,
}

static HUMAN: RaceProfile = RaceProfile {
    race: Race::Human,
    modifiers: &[(Attribute::Leadership, 1.0), (Attribute::Throwing, 1.0)],
    late_match: &[(Attribute::Throwing, 3.0), (Attribute::Catching, 2.0)],
    tick_effect: RaceTickEffect::None,
    signature_skill: "Rally Cry",
};

static SYLVAN: RaceProfile = RaceProfile {
    race: Race::Sylvan,
    modifiers: &[(Attribute::Speed, 3.0), (Attribute::Agility, 4.0), (Attribute::Power, -2.0)],
    late_match: &[],
    tick_effect: RaceTickEffect::Regeneration,
    signature_skill: "Nature's Grace",
};

static GRYLL: RaceProfile = RaceProfile {
    race: Race::Gryll,
    modifiers: &[
        (Attribute::Power, 5.0),
        (Attribute::Stamina, 3.0),
        (Attribute::Speed, -3.0),
        (Attribute::Agility, -2.0),
    ],
    late_match: &[],
    tick_effect: RaceTickEffect::None,
    signature_skill: "Bulwark Stance",
};

static LUMINA: RaceProfile = RaceProfile {
    race: Race::Lumina,
    modifiers: &[(Attribute::Throwing, 4.0), (Attribute::Leadership, 2.0)],
    late_match: &[],
    tick_effect: RaceTickEffect::Radiance,
    signature_skill: "Radiant Light",
};

static UMBRA: RaceProfile = RaceProfile {
    race: Race::Umbra,
    modifiers: &[(Attribute::Speed, 2.0), (Attribute::Agility, 3.0), (Attribute::Power, -1.0)],
    late_match: &[],
    tick_effect: RaceTickEffect::None,
    signature_skill: "Shadow Step",
};

pub fn race_profile(race: Race) -> &'static RaceProfile {
    match race {
        Race::Human => &HUMAN,
        Race::Sylvan => &SYLVAN,
        Race::Gryll => &GRYLL,
        Race::Lumina => &LUMINA,
        Race::Umbra => &UMBRA,
    }
}

fn table_modifier(table: &[(Attribute, f32)], attribute: Attribute) -> f32 {
    table.iter().filter(|(a, _)| *a == attribute).map(|(_, v)| *v).sum()
}

// ============================================================================
// Effective attributes
// ============================================================================

/// Inputs beyond the player itself.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceContext<'a> {
    pub camaraderie: u8,
    /// Match progress 0.0 (kickoff) ..= 1.0 (final whistle)
    pub progress: f32,
    pub thresholds: &'a ThresholdsConfig,
}

/// Effective value of one attribute: base (clamped) → fatigue → injury →
/// race → camaraderie → final clamp to `[1, cap + headroom]`.
pub fn effective_attribute(player: &Player, attribute: Attribute, ctx: &PerformanceContext) -> f32 {
    let t = ctx.thresholds;
    let mut value = (player.attributes.get(attribute) as f32).clamp(1.0, t.max_attribute);

    value -= fatigue_penalty(player.stamina(), attribute, t);

    if attribute.is_physical() {
        value -= player.injury.attribute_penalty();
    }

    let profile = race_profile(player.race);
    value += table_modifier(profile.modifiers, attribute);
    if ctx.progress >= t.late_match_progress {
        value += table_modifier(profile.late_match, attribute);
    }

    if ctx.camaraderie >= t.camaraderie_high {
        value += t.camaraderie_modifier;
    } else if ctx.camaraderie <= t.camaraderie_low {
        value -= t.camaraderie_modifier;
    }

    if !value.is_finite() {
        return 1.0;
    }
    value.clamp(1.0, t.effective_cap())
}

/// Linear fatigue penalty: speed and agility lose one point per
/// `fatigue_points_per_penalty` stamina under the threshold, power half that.
pub fn fatigue_penalty(stamina: f32, attribute: Attribute, t: &ThresholdsConfig) -> f32 {
    if stamina >= t.fatigue_stamina_threshold {
        return 0.0;
    }
    let deficit = (t.fatigue_stamina_threshold - stamina.max(0.0)) / t.fatigue_points_per_penalty.max(f32::EPSILON);
    match attribute {
        Attribute::Speed | Attribute::Agility => deficit,
        Attribute::Power => deficit * 0.5,
        _ => 0.0,
    }
}

/// Weighted blend of effective attributes normalized to `0..=1`.
pub fn composite(player: &Player, weights: &[(Attribute, f32)], ctx: &PerformanceContext) -> f32 {
    let total: f32 = weights.iter().map(|(_, w)| *w).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let blended: f32 = weights
        .iter()
        .map(|(attr, w)| effective_attribute(player, *attr, ctx) * w)
        .sum::<f32>()
        / total;
    (blended / ctx.thresholds.effective_cap()).clamp(0.0, 1.0)
}

// ============================================================================
// Per-tick effects
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum RaceEffectOutcome {
    Regenerated { player_id: String, amount: f32 },
    /// Team-wide restoration triggered by this player
    Radiance { player_id: String, amount: f32 },
}

/// Rolls every race tick effect for one team and applies the stamina changes.
/// At most one radiance per team per tick.
pub fn apply_tick_race_effects<R: Rng>(
    team: &mut Team,
    cfg: &StaminaConfig,
    rng: &mut R,
) -> Vec<RaceEffectOutcome> {
    let mut outcomes = Vec::new();
    let mut radiance_source: Option<String> = None;

    for player in team.players.iter_mut().filter(|p| p.is_available()) {
        match race_profile(player.race).tick_effect {
            RaceTickEffect::None => {}
            RaceTickEffect::Regeneration => {
                if rng.gen_bool(cfg.sylvan_regen_chance.clamp(0.0, 1.0)) {
                    player.adjust_stamina(cfg.sylvan_regen_amount);
                    outcomes.push(RaceEffectOutcome::Regenerated {
                        player_id: player.id.clone(),
                        amount: cfg.sylvan_regen_amount,
                    });
                }
            }
            RaceTickEffect::Radiance => {
                if radiance_source.is_none() && rng.gen_bool(cfg.lumina_radiance_chance.clamp(0.0, 1.0)) {
                    radiance_source = Some(player.id.clone());
                }
            }
        }
    }

    if let Some(player_id) = radiance_source {
        for player in team.players.iter_mut().filter(|p| p.is_available()) {
            player.adjust_stamina(cfg.lumina_radiance_amount);
        }
        outcomes.push(RaceEffectOutcome::Radiance { player_id, amount: cfg.lumina_radiance_amount });
    }

    outcomes
}

/// Passive drain for every available player; a high effective stamina
/// attribute slows it down.
pub fn drain_team_stamina(team: &mut Team, cfg: &StaminaConfig, thresholds: &ThresholdsConfig, progress: f32) {
    let camaraderie = team.camaraderie;
    for player in team.players.iter_mut().filter(|p| p.is_available()) {
        let ctx = PerformanceContext { camaraderie, progress, thresholds };
        let stamina_attr = effective_attribute(player, Attribute::Stamina, &ctx) / thresholds.effective_cap();
        let drain = cfg.base_drain_per_tick * (1.0 - cfg.stamina_attr_impact * stamina_attr).max(0.1);
        player.adjust_stamina(-drain);
    }
}
