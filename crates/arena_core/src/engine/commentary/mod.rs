//! Commentary selector.
//!
//! Picks one template for a resolved play and fills its placeholders. Never
//! touches match state.

pub mod templates;

use rand::seq::SliceRandom;
use rand::Rng;

use super::config::CommentaryConfig;
use super::draft::EventDraft;
use crate::models::Race;

/// Names and numbers a template may reference.
#[derive(Debug, Clone, Default)]
pub struct CommentaryContext<'a> {
    pub home: &'a str,
    pub away: &'a str,
    /// Name of the draft's acting team
    pub team: Option<&'a str>,
    pub opponent: Option<&'a str>,
    pub player: Option<&'a str>,
    pub player_race: Option<Race>,
    pub target: Option<&'a str>,
    pub home_score: u32,
    pub away_score: u32,
    pub clock_secs: u32,
}

#[derive(Debug, Clone)]
pub struct CommentarySelector {
    config: CommentaryConfig,
}

impl CommentarySelector {
    pub fn new(config: CommentaryConfig) -> Self {
        Self { config }
    }

    /// Lost ground gets the loss pool outright. Otherwise race flavor first
    /// (when the actor's race has a pool), then the breakaway pool for long
    /// gains, then the neutral pool.
    pub fn select<R: Rng>(&self, draft: &EventDraft, ctx: &CommentaryContext, rng: &mut R) -> String {
        if let Some(pool) = templates::loss_pool(draft.category).filter(|_| draft.yards.is_some_and(|y| y < 0)) {
            let template = pool.choose(rng).copied().unwrap_or("...");
            return fill(template, draft, ctx);
        }

        let flavored = ctx
            .player_race
            .and_then(|race| templates::race_pool(draft.category, race))
            .filter(|_| rng.gen_bool(self.config.race_flavor_probability.clamp(0.0, 1.0)));

        let pool = flavored
            .or_else(|| templates::long_gain_pool(draft.category).filter(|_| draft.long_gain))
            .unwrap_or_else(|| templates::neutral_pool(draft.category));

        let template = pool.choose(rng).copied().unwrap_or("...");
        fill(template, draft, ctx)
    }
}

impl Default for CommentarySelector {
    fn default() -> Self {
        Self::new(CommentaryConfig::default())
    }
}

pub fn format_clock(clock_secs: u32) -> String {
    format!("{:02}:{:02}", clock_secs / 60, clock_secs % 60)
}

fn fill(template: &str, draft: &EventDraft, ctx: &CommentaryContext) -> String {
    let mut line = template.to_string();
    let replacements = [
        ("{player}", ctx.player.unwrap_or("Someone").to_string()),
        ("{target}", ctx.target.unwrap_or("the defense").to_string()),
        ("{team}", ctx.team.unwrap_or(ctx.home).to_string()),
        ("{opponent}", ctx.opponent.unwrap_or(ctx.away).to_string()),
        ("{yards}", draft.yards.unwrap_or(0).abs().to_string()),
        ("{home_score}", ctx.home_score.to_string()),
        ("{away_score}", ctx.away_score.to_string()),
        ("{home}", ctx.home.to_string()),
        ("{away}", ctx.away.to_string()),
        ("{severity}", draft.injury.map(|i| i.label()).unwrap_or("minor").to_string()),
        ("{skill}", draft.skill.unwrap_or("a special move").to_string()),
        ("{clock}", format_clock(ctx.clock_secs)),
    ];
    for (key, value) in replacements {
        if line.contains(key) {
            line = line.replace(key, &value);
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventCategory, InjuryState, TeamSide};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ctx() -> CommentaryContext<'static> {
        CommentaryContext {
            home: "Ironclad Wardens",
            away: "Gloamwood Stalkers",
            team: Some("Ironclad Wardens"),
            opponent: Some("Gloamwood Stalkers"),
            player: Some("Brakka"),
            player_race: Some(Race::Gryll),
            target: Some("Vel"),
            home_score: 2,
            away_score: 1,
            clock_secs: 754,
        }
    }

    #[test]
    fn test_no_placeholder_survives() {
        let selector = CommentarySelector::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for category in EventCategory::ALL {
            let draft = EventDraft::new(category)
                .team(TeamSide::Home)
                .primary("a")
                .secondary("b")
                .yards(7)
                .injury(InjuryState::Moderate)
                .skill("Bulwark Stance");
            for _ in 0..30 {
                let line = selector.select(&draft, &ctx(), &mut rng);
                assert!(!line.contains('{'), "unfilled placeholder in {line}");
                assert!(!line.is_empty());
            }
        }
    }

    #[test]
    fn test_long_gain_uses_breakaway_pool() {
        let selector = CommentarySelector::new(CommentaryConfig { race_flavor_probability: 0.0 });
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let draft = EventDraft::new(EventCategory::Run).primary("a").yards(18).long_gain(true);
        for _ in 0..20 {
            let line = selector.select(&draft, &ctx(), &mut rng);
            assert!(line.contains("18"));
            let filled: Vec<String> =
                templates::long_gain_pool(EventCategory::Run).unwrap().iter().map(|t| fill(t, &draft, &ctx())).collect();
            assert!(filled.contains(&line));
        }
    }

    #[test]
    fn test_race_flavor_always_when_probability_one() {
        let selector = CommentarySelector::new(CommentaryConfig { race_flavor_probability: 1.0 });
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let draft = EventDraft::new(EventCategory::Knockdown).primary("a").secondary("b");
        let pool = templates::race_pool(EventCategory::Knockdown, Race::Gryll).unwrap();
        let filled: Vec<String> = pool.iter().map(|t| fill(t, &draft, &ctx())).collect();
        for _ in 0..10 {
            assert!(filled.contains(&selector.select(&draft, &ctx(), &mut rng)));
        }
    }

    #[test]
    fn test_run_for_negative_yards_reads_as_a_loss() {
        let selector = CommentarySelector::new(CommentaryConfig { race_flavor_probability: 1.0 });
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let draft = EventDraft::new(EventCategory::Run).primary("a").yards(-3).long_gain(true);
        let filled: Vec<String> =
            templates::loss_pool(EventCategory::Run).unwrap().iter().map(|t| fill(t, &draft, &ctx())).collect();
        for _ in 0..20 {
            let line = selector.select(&draft, &ctx(), &mut rng);
            assert!(filled.contains(&line), "gain template for a loss: {line}");
            assert!(line.contains('3'));
        }

        // zero yards is not a loss
        let flat = EventDraft::new(EventCategory::Run).primary("a").yards(0);
        let line = selector.select(&flat, &ctx(), &mut rng);
        let losses: Vec<String> =
            templates::loss_pool(EventCategory::Run).unwrap().iter().map(|t| fill(t, &flat, &ctx())).collect();
        assert!(!losses.contains(&line));
    }

    #[test]
    fn test_clock_format() {
        assert_eq!(format_clock(754), "12:34");
        assert_eq!(format_clock(5), "00:05");
    }
}
