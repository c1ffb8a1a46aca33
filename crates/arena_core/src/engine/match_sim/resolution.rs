//! Play resolution: turns a play call into a chain of event drafts.
//!
//! The resolver only reads match state. Ball movement, possession changes,
//! injuries and stamina costs are applied by the engine as each draft is
//! emitted, so a chain cut short by a degraded draft leaves no half-applied
//! state behind.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::selection::{self, PlayCall};
use crate::engine::config::EngineConfig;
use crate::engine::draft::EventDraft;
use crate::engine::performance::{composite, effective_attribute, race_profile, PerformanceContext};
use crate::models::{Attribute, EventCategory, InjuryState, Player, Team, TeamSide};

/// Ball line at which the offense scores.
pub const GOAL_LINE: i32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct StaminaChange {
    pub side: TeamSide,
    pub player_id: String,
    pub delta: f32,
}

/// Resolved play: drafts in emission order plus the stamina bill.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Play {
    pub drafts: Vec<EventDraft>,
    pub stamina: Vec<StaminaChange>,
}

impl Play {
    pub fn filler(team: Option<TeamSide>) -> Self {
        Self { drafts: vec![EventDraft::general_play(team)], stamina: Vec::new() }
    }

    fn push(&mut self, draft: EventDraft) {
        self.drafts.push(draft);
    }

    fn stamina(&mut self, side: TeamSide, player: &Player, delta: f32) {
        self.stamina.push(StaminaChange { side, player_id: player.id.clone(), delta });
    }

    pub fn categories(&self) -> Vec<EventCategory> {
        self.drafts.iter().map(|d| d.category).collect()
    }
}

pub struct Resolver<'a> {
    pub offense: &'a Team,
    pub defense: &'a Team,
    pub offense_side: TeamSide,
    pub config: &'a EngineConfig,
    /// Match progress 0..=1
    pub progress: f32,
    pub ball_line: i32,
}

impl<'a> Resolver<'a> {
    pub fn resolve<R: Rng>(&self, call: PlayCall, rng: &mut R) -> Play {
        match call {
            PlayCall::Pass => self.pass(rng),
            PlayCall::Run => self.run(rng),
            PlayCall::Block => self.block(rng),
            PlayCall::SkillUse => self.skill_use(rng),
            PlayCall::Atmosphere => self.atmosphere(),
            PlayCall::Injury => self.injury(rng),
        }
    }

    fn defense_side(&self) -> TeamSide {
        self.offense_side.opponent()
    }

    fn context(&self, team: &Team) -> PerformanceContext<'a> {
        PerformanceContext {
            camaraderie: team.camaraderie,
            progress: self.progress,
            thresholds: &self.config.thresholds,
        }
    }

    fn side_of(&self, team: &Team) -> TeamSide {
        if std::ptr::eq(team, self.offense) {
            self.offense_side
        } else {
            self.defense_side()
        }
    }

    fn gain<R: Rng>(&self, mean: f32, sd: f32, min: i32, max: i32, rng: &mut R) -> i32 {
        let sample = Normal::new(mean, sd).map(|n| n.sample(rng)).unwrap_or(mean);
        let yards = if sample.is_finite() { sample.round() as i32 } else { 0 };
        yards.clamp(min, max)
    }

    /// Keeps a gain on the field: never past the goal line, never behind
    /// the offense's own line.
    fn fit_to_field(&self, yards: i32) -> i32 {
        yards.clamp(-self.ball_line, GOAL_LINE - self.ball_line)
    }

    fn is_long(&self, yards: i32) -> bool {
        yards >= self.config.thresholds.breakaway_yards
    }

    // ========================================================================
    // Play calls
    // ========================================================================

    fn pass<R: Rng>(&self, rng: &mut R) -> Play {
        let off = self.context(self.offense);
        let def = self.context(self.defense);

        let Some(passer) = selection::pick_player(
            &selection::passers(self.offense),
            |p| effective_attribute(p, Attribute::Throwing, &off),
            rng,
        ) else {
            return Play::filler(Some(self.offense_side));
        };
        let Some(receiver) = selection::pick_player(
            &selection::receivers(self.offense, &passer.id),
            |p| effective_attribute(p, Attribute::Catching, &off) + effective_attribute(p, Attribute::Speed, &off),
            rng,
        ) else {
            return Play::filler(Some(self.offense_side));
        };
        let Some(defender) = selection::pick_player(
            &selection::anyone(self.defense),
            |p| effective_attribute(p, Attribute::Agility, &def),
            rng,
        ) else {
            return Play::filler(Some(self.offense_side));
        };

        let w = &self.config.weights;
        let stamina = &self.config.stamina;
        let arm = composite(passer, &[(Attribute::Throwing, 0.7), (Attribute::Leadership, 0.3)], &off);
        let hands = composite(receiver, &[(Attribute::Catching, 0.6), (Attribute::Speed, 0.2), (Attribute::Agility, 0.2)], &off);
        let coverage = composite(defender, &[(Attribute::Agility, 0.6), (Attribute::Catching, 0.4)], &def);

        let interception = (w.pass_base_interception * (1.0 + 2.0 * (coverage - arm)).clamp(0.25, 3.0)).clamp(0.0, 1.0);
        let completion = (w.pass_base_completion * (0.7 + 0.6 * (arm + 0.5 * hands - coverage))).clamp(0.0, 1.0);

        let mut play = Play::default();
        play.stamina(self.offense_side, passer, -stamina.pass_cost);

        let roll: f32 = rng.gen();
        if roll < interception {
            play.push(
                EventDraft::new(EventCategory::Interception)
                    .team(self.defense_side())
                    .primary(&defender.id)
                    .secondary(&passer.id),
            );
            return play;
        }

        if roll < interception + completion {
            let yards = self.fit_to_field(self.gain(5.0 + 14.0 * arm, 6.0, 1, 70, rng));
            play.push(
                EventDraft::new(EventCategory::PassComplete)
                    .team(self.offense_side)
                    .primary(&passer.id)
                    .secondary(&receiver.id)
                    .yards(yards)
                    .long_gain(self.is_long(yards)),
            );
            play.stamina(self.offense_side, receiver, -stamina.run_cost);

            if self.ball_line + yards >= GOAL_LINE {
                self.score_chain(receiver, &mut play);
            } else if rng.gen_bool(w.tackle_after_catch_chance.clamp(0.0, 1.0)) {
                self.tackle_chain(receiver, &mut play, rng);
            }
            return play;
        }

        let drop_chance = (0.45 * (1.0 - hands)).clamp(0.0, 1.0);
        let draft = if rng.gen::<f32>() < drop_chance {
            EventDraft::new(EventCategory::Drop).secondary(&receiver.id)
        } else {
            EventDraft::new(EventCategory::PassIncomplete)
        };
        play.push(draft.team(self.offense_side).primary(&passer.id));
        play
    }

    fn run<R: Rng>(&self, rng: &mut R) -> Play {
        let off = self.context(self.offense);
        let def = self.context(self.defense);

        let Some(carrier) = selection::pick_player(
            &selection::carriers(self.offense),
            |p| effective_attribute(p, Attribute::Speed, &off),
            rng,
        ) else {
            return Play::filler(Some(self.offense_side));
        };

        let burst = composite(carrier, &[(Attribute::Speed, 0.5), (Attribute::Agility, 0.3), (Attribute::Power, 0.2)], &off);
        let front = self
            .defense
            .available()
            .map(|p| composite(p, &[(Attribute::Power, 0.6), (Attribute::Agility, 0.4)], &def))
            .fold(0.0f32, f32::max);

        let yards = self.fit_to_field(self.gain(2.0 + 8.0 * burst - 4.0 * front, 4.5, -5, 80, rng));

        let mut play = Play::default();
        play.push(
            EventDraft::new(EventCategory::Run)
                .team(self.offense_side)
                .primary(&carrier.id)
                .yards(yards)
                .long_gain(self.is_long(yards)),
        );
        play.stamina(self.offense_side, carrier, -self.config.stamina.run_cost);

        if self.ball_line + yards >= GOAL_LINE {
            self.score_chain(carrier, &mut play);
        } else {
            self.tackle_chain(carrier, &mut play, rng);
        }
        play
    }

    fn block<R: Rng>(&self, rng: &mut R) -> Play {
        let (hitting, victims) = if rng.gen_bool(0.5) {
            (self.offense, self.defense)
        } else {
            (self.defense, self.offense)
        };
        let hit_ctx = self.context(hitting);

        let Some(hitter) = selection::pick_player(
            &selection::hitters(hitting),
            |p| effective_attribute(p, Attribute::Power, &hit_ctx),
            rng,
        ) else {
            return Play::filler(Some(self.side_of(hitting)));
        };
        let Some(victim) = selection::pick_player(&selection::anyone(victims), |_| 1.0, rng) else {
            return Play::filler(Some(self.side_of(hitting)));
        };

        let power_hit = effective_attribute(hitter, Attribute::Power, &hit_ctx) > self.config.thresholds.knockdown_power_threshold;
        let stamina = &self.config.stamina;

        let mut play = Play::default();
        play.push(
            EventDraft::new(EventCategory::Knockdown)
                .team(self.side_of(hitting))
                .primary(&hitter.id)
                .secondary(&victim.id)
                .power_hit(power_hit),
        );
        play.stamina(self.side_of(hitting), hitter, -stamina.hit_cost);
        play.stamina(self.side_of(victims), victim, -stamina.knocked_down_cost);

        if power_hit && rng.gen_bool(self.config.weights.injury_on_power_hit_chance.clamp(0.0, 1.0)) {
            play.push(
                EventDraft::new(EventCategory::Injury)
                    .team(self.side_of(victims))
                    .primary(&victim.id)
                    .injury(roll_severity(&HIT_SEVERITY, rng)),
            );
        }
        play
    }

    fn skill_use<R: Rng>(&self, rng: &mut R) -> Play {
        let team = if rng.gen_bool(0.6) { self.offense } else { self.defense };
        let ctx = self.context(team);
        let Some(user) = selection::pick_player(
            &selection::anyone(team),
            |p| effective_attribute(p, Attribute::Leadership, &ctx),
            rng,
        ) else {
            return Play::filler(Some(self.side_of(team)));
        };

        let mut play = Play::default();
        play.push(
            EventDraft::new(EventCategory::SkillUse)
                .team(self.side_of(team))
                .primary(&user.id)
                .skill(race_profile(user.race).signature_skill),
        );
        play.stamina(self.side_of(team), user, self.config.stamina.skill_recovery);
        play
    }

    fn atmosphere(&self) -> Play {
        let mut play = Play::default();
        play.push(EventDraft::new(EventCategory::Atmosphere).team(self.offense_side));
        play
    }

    fn injury<R: Rng>(&self, rng: &mut R) -> Play {
        let team = if rng.gen_bool(0.5) { self.offense } else { self.defense };
        let Some(victim) = selection::pick_player(&selection::anyone(team), |_| 1.0, rng) else {
            return Play::filler(Some(self.side_of(team)));
        };
        let mut play = Play::default();
        play.push(
            EventDraft::new(EventCategory::Injury)
                .team(self.side_of(team))
                .primary(&victim.id)
                .injury(roll_severity(&PLAY_SEVERITY, rng)),
        );
        play
    }

    // ========================================================================
    // Chains
    // ========================================================================

    /// Score by `scorer`, then the scoring team kicks off.
    fn score_chain(&self, scorer: &Player, play: &mut Play) {
        play.push(EventDraft::new(EventCategory::Score).team(self.offense_side).primary(&scorer.id));
        play.push(kickoff_draft(self.offense, self.offense_side));
    }

    /// Ends a carry: a tackle (possibly a power hit and an injury) or a
    /// forced fumble and its recovery.
    fn tackle_chain<R: Rng>(&self, carrier: &Player, play: &mut Play, rng: &mut R) {
        let off = self.context(self.offense);
        let def = self.context(self.defense);
        let stamina = &self.config.stamina;

        let Some(tackler) = selection::pick_player(
            &selection::anyone(self.defense),
            |p| composite(p, &[(Attribute::Power, 0.6), (Attribute::Agility, 0.4)], &def),
            rng,
        ) else {
            return;
        };

        let stop = composite(tackler, &[(Attribute::Power, 0.6), (Attribute::Agility, 0.4)], &def);
        let security = composite(carrier, &[(Attribute::Power, 0.4), (Attribute::Agility, 0.3), (Attribute::Catching, 0.3)], &off);
        let fumble = (self.config.weights.fumble_base_chance * (1.0 + stop - security).clamp(0.5, 2.0)).clamp(0.0, 1.0);

        play.stamina(self.defense_side(), tackler, -stamina.hit_cost);

        if rng.gen::<f32>() < fumble {
            play.push(
                EventDraft::new(EventCategory::Fumble)
                    .team(self.defense_side())
                    .primary(&tackler.id)
                    .secondary(&carrier.id),
            );
            play.stamina(self.offense_side, carrier, -stamina.hit_cost);

            let defense_recovers = rng.gen_bool((0.5 + 0.3 * (stop - security) as f64).clamp(0.2, 0.8));
            let recovering = if defense_recovers { self.defense } else { self.offense };
            let rec_ctx = self.context(recovering);
            if let Some(recoverer) = selection::pick_player(
                &selection::anyone(recovering),
                |p| effective_attribute(p, Attribute::Agility, &rec_ctx),
                rng,
            ) {
                play.push(
                    EventDraft::new(EventCategory::FumbleRecovery)
                        .team(self.side_of(recovering))
                        .primary(&recoverer.id),
                );
            }
            return;
        }

        let power_hit = effective_attribute(tackler, Attribute::Power, &def) > self.config.thresholds.knockdown_power_threshold;
        play.push(
            EventDraft::new(EventCategory::Tackle)
                .team(self.defense_side())
                .primary(&tackler.id)
                .secondary(&carrier.id)
                .power_hit(power_hit),
        );

        if power_hit {
            play.stamina(self.offense_side, carrier, -stamina.knocked_down_cost);
            if rng.gen_bool(self.config.weights.injury_on_power_hit_chance.clamp(0.0, 1.0)) {
                play.push(
                    EventDraft::new(EventCategory::Injury)
                        .team(self.offense_side)
                        .primary(&carrier.id)
                        .injury(roll_severity(&HIT_SEVERITY, rng)),
                );
            }
        } else {
            play.stamina(self.offense_side, carrier, -stamina.hit_cost);
        }
    }
}

/// Kickoff by `kicking`, from its best available kicker.
pub fn kickoff_draft(kicking: &Team, side: TeamSide) -> EventDraft {
    let kicker = kicking
        .available()
        .fold(None::<&Player>, |best, p| match best {
            Some(b) if b.attributes.kicking >= p.attributes.kicking => Some(b),
            _ => Some(p),
        });
    let draft = EventDraft::new(EventCategory::Kickoff).team(side);
    match kicker {
        Some(p) => draft.primary(&p.id),
        None => draft,
    }
}

const SEVERITIES: [InjuryState; 3] = [InjuryState::Minor, InjuryState::Moderate, InjuryState::Severe];
const PLAY_SEVERITY: [f32; 3] = [0.70, 0.22, 0.08];
const HIT_SEVERITY: [f32; 3] = [0.60, 0.30, 0.10];

fn roll_severity<R: Rng>(weights: &[f32; 3], rng: &mut R) -> InjuryState {
    selection::weighted_index(weights, rng)
        .map(|idx| SEVERITIES[idx])
        .unwrap_or(InjuryState::Minor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::attribution::deltas_for;
    use crate::models::fixtures::demo_pair;
    use crate::models::{Race, StatKind, StatTarget};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn resolver<'a>(home: &'a Team, away: &'a Team, config: &'a EngineConfig, ball_line: i32) -> Resolver<'a> {
        Resolver { offense: home, defense: away, offense_side: TeamSide::Home, config, progress: 0.3, ball_line }
    }

    fn gryll_wall(team: &mut Team) {
        for p in team.players.iter_mut() {
            p.race = Race::Gryll;
            p.attributes.power = 60;
        }
    }

    #[test]
    fn test_every_call_produces_a_draft() {
        let (home, away) = demo_pair();
        let config = EngineConfig::default();
        let r = resolver(&home, &away, &config, 40);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for call in PlayCall::ALL {
            for _ in 0..25 {
                let play = r.resolve(call, &mut rng);
                assert!(!play.drafts.is_empty(), "{call:?} resolved to nothing");
                for draft in &play.drafts {
                    assert!(deltas_for(draft).is_ok(), "{draft:?} is not attributable");
                }
            }
        }
    }

    #[test]
    fn test_gain_into_goal_line_scores_then_kicks_off() {
        let (home, away) = demo_pair();
        let config = EngineConfig::default();
        let r = resolver(&home, &away, &config, 99);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let mut scored = false;
        for _ in 0..50 {
            let play = r.resolve(PlayCall::Run, &mut rng);
            let run = &play.drafts[0];
            assert!(run.yards.unwrap() <= 1);
            if run.yards == Some(1) {
                assert_eq!(&play.categories()[1..], &[EventCategory::Score, EventCategory::Kickoff]);
                assert_eq!(play.drafts[1].primary, run.primary);
                assert_eq!(play.drafts[2].team, Some(TeamSide::Home));
                scored = true;
            }
        }
        assert!(scored);
    }

    #[test]
    fn test_power_tackle_always_flags_knockdown() {
        let (home, mut away) = demo_pair();
        gryll_wall(&mut away);
        let mut config = EngineConfig::default();
        config.weights.fumble_base_chance = 0.0;
        let r = resolver(&home, &away, &config, 30);
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        let mut tackles = 0;
        for _ in 0..40 {
            let play = r.resolve(PlayCall::Run, &mut rng);
            for draft in play.drafts.iter().filter(|d| d.category == EventCategory::Tackle) {
                tackles += 1;
                assert!(draft.power_hit);
                let deltas = deltas_for(draft).unwrap();
                let tackler = draft.primary.clone().unwrap();
                assert!(deltas.iter().any(|d| d.target == StatTarget::Player(tackler.clone())
                    && d.stat == StatKind::KnockdownsInflicted));
            }
        }
        assert!(tackles > 0);
    }

    #[test]
    fn test_forced_fumble_chain() {
        let (home, away) = demo_pair();
        let mut config = EngineConfig::default();
        // saturates past 1.0
        config.weights.fumble_base_chance = 4.0;
        let r = resolver(&home, &away, &config, 20);
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        for _ in 0..20 {
            let play = r.resolve(PlayCall::Run, &mut rng);
            if play.drafts[0].yards.map(|y| 20 + y >= GOAL_LINE).unwrap_or(false) {
                continue;
            }
            assert_eq!(&play.categories()[1..], &[EventCategory::Fumble, EventCategory::FumbleRecovery]);
            let fumble = &play.drafts[1];
            assert_eq!(fumble.team, Some(TeamSide::Away));
            assert_eq!(fumble.secondary, play.drafts[0].primary);
            assert!(away.player(fumble.primary.as_deref().unwrap()).is_some());
        }
    }

    #[test]
    fn test_interception_belongs_to_defense() {
        let (home, away) = demo_pair();
        let mut config = EngineConfig::default();
        config.weights.pass_base_interception = 4.0;
        let r = resolver(&home, &away, &config, 50);
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let play = r.resolve(PlayCall::Pass, &mut rng);
        assert_eq!(play.categories(), vec![EventCategory::Interception]);
        let draft = &play.drafts[0];
        assert_eq!(draft.team, Some(TeamSide::Away));
        assert!(away.player(draft.primary.as_deref().unwrap()).is_some());
        assert!(home.player(draft.secondary.as_deref().unwrap()).is_some());
    }

    #[test]
    fn test_no_eligible_players_degrades_to_general_play() {
        let (mut home, away) = demo_pair();
        for p in home.players.iter_mut() {
            p.injury = InjuryState::Severe;
        }
        let config = EngineConfig::default();
        let r = resolver(&home, &away, &config, 50);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for call in [PlayCall::Pass, PlayCall::Run] {
            assert_eq!(r.resolve(call, &mut rng).categories(), vec![EventCategory::GeneralPlay]);
        }
    }

    #[test]
    fn test_kickoff_uses_best_kicker() {
        let (mut home, _) = demo_pair();
        home.players[3].attributes.kicking = 59;
        let draft = kickoff_draft(&home, TeamSide::Home);
        assert_eq!(draft.primary.as_deref(), Some(home.players[3].id.as_str()));
    }
}
