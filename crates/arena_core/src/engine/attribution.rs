//! Attribution table: the one place that decides which counters an event
//! touches.
//!
//! Every [`EventCategory`] maps to exactly one [`AttributionRule`] through an
//! exhaustive `match`, so adding a category without a rule does not compile.
//! The generator never mutates stats any other way.

use thiserror::Error;

use super::draft::EventDraft;
use crate::models::{EventCategory, StatDelta, StatKind};

/// Amount of a delta: a fixed count or the play's yardage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    One,
    Yards,
}

/// Deltas for one category. `primary` / `secondary` refer to the draft's
/// actors, `team` to the acting team and `opponent` to the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributionRule {
    pub primary: &'static [(StatKind, Amount)],
    pub secondary: &'static [(StatKind, Amount)],
    pub team: &'static [StatKind],
    pub opponent: &'static [StatKind],
    /// Extra primary deltas when the draft is flagged as a power hit
    pub power_hit: &'static [StatKind],
}

const NONE: AttributionRule = AttributionRule {
    primary: &[],
    secondary: &[],
    team: &[],
    opponent: &[],
    power_hit: &[],
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributionError {
    #[error("{category:?} needs a {slot} actor")]
    MissingActor { category: EventCategory, slot: &'static str },
    #[error("{0:?} needs an acting team")]
    MissingTeam(EventCategory),
}

pub fn rule_for(category: EventCategory) -> AttributionRule {
    use Amount::{One, Yards};
    use StatKind::*;

    match category {
        EventCategory::Score => AttributionRule {
            primary: &[(Scores, One)],
            team: &[TeamScore],
            ..NONE
        },
        EventCategory::PassComplete => AttributionRule {
            primary: &[(PassAttempts, One), (PassCompletions, One), (PassingYards, Yards)],
            secondary: &[(Receptions, One), (ReceivingYards, Yards)],
            ..NONE
        },
        EventCategory::PassIncomplete => AttributionRule { primary: &[(PassAttempts, One)], ..NONE },
        EventCategory::Drop => AttributionRule {
            primary: &[(PassAttempts, One)],
            secondary: &[(Drops, One)],
            ..NONE
        },
        EventCategory::Run => AttributionRule {
            primary: &[(RushAttempts, One), (RushingYards, Yards)],
            ..NONE
        },
        EventCategory::Tackle => AttributionRule {
            primary: &[(Tackles, One)],
            power_hit: &[KnockdownsInflicted],
            ..NONE
        },
        EventCategory::Knockdown => AttributionRule {
            primary: &[(KnockdownsInflicted, One)],
            secondary: &[(KnockedDown, One)],
            ..NONE
        },
        EventCategory::Interception => AttributionRule {
            primary: &[(Interceptions, One), (PassDefenses, One)],
            secondary: &[(PassAttempts, One), (InterceptionsThrown, One)],
            opponent: &[Turnovers],
            ..NONE
        },
        EventCategory::Fumble => AttributionRule {
            primary: &[(FumblesForced, One)],
            secondary: &[(FumblesLost, One)],
            opponent: &[Turnovers],
            ..NONE
        },
        EventCategory::FumbleRecovery => AttributionRule { primary: &[(FumblesRecovered, One)], ..NONE },
        EventCategory::Injury => AttributionRule { primary: &[(InjuriesSustained, One)], ..NONE },
        EventCategory::SkillUse => AttributionRule { primary: &[(SkillUses, One)], ..NONE },
        EventCategory::Kickoff
        | EventCategory::Atmosphere
        | EventCategory::GeneralPlay
        | EventCategory::Halftime
        | EventCategory::Fulltime => NONE,
    }
}

impl AttributionRule {
    /// Every stat this rule may ever touch.
    pub fn declared_stats(&self) -> Vec<StatKind> {
        self.primary
            .iter()
            .chain(self.secondary.iter())
            .map(|(stat, _)| *stat)
            .chain(self.team.iter().copied())
            .chain(self.opponent.iter().copied())
            .chain(self.power_hit.iter().copied())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.declared_stats().is_empty()
    }
}

/// Computes the deltas for a draft from its category's rule.
pub fn deltas_for(draft: &EventDraft) -> Result<Vec<StatDelta>, AttributionError> {
    let rule = rule_for(draft.category);
    let mut deltas = Vec::new();
    let amount = |a: Amount| match a {
        Amount::One => 1,
        Amount::Yards => draft.yards.unwrap_or(0),
    };

    if !rule.primary.is_empty() || !rule.power_hit.is_empty() {
        let id = draft
            .primary
            .as_deref()
            .ok_or(AttributionError::MissingActor { category: draft.category, slot: "primary" })?;
        for (stat, a) in rule.primary {
            deltas.push(StatDelta::player(id, *stat, amount(*a)));
        }
        if draft.power_hit {
            for stat in rule.power_hit {
                deltas.push(StatDelta::player(id, *stat, 1));
            }
        }
    }

    if !rule.secondary.is_empty() {
        let id = draft
            .secondary
            .as_deref()
            .ok_or(AttributionError::MissingActor { category: draft.category, slot: "secondary" })?;
        for (stat, a) in rule.secondary {
            deltas.push(StatDelta::player(id, *stat, amount(*a)));
        }
    }

    if !rule.team.is_empty() || !rule.opponent.is_empty() {
        let side = draft.team.ok_or(AttributionError::MissingTeam(draft.category))?;
        for stat in rule.team {
            deltas.push(StatDelta::team(side, *stat, 1));
        }
        for stat in rule.opponent {
            deltas.push(StatDelta::team(side.opponent(), *stat, 1));
        }
    }

    Ok(deltas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StatTarget, TeamSide};

    #[test]
    fn test_every_category_has_exactly_one_rule() {
        // exhaustive match guarantees one rule; check stat sets don't overlap
        // between player slots of the same rule
        for category in EventCategory::ALL {
            let rule = rule_for(category);
            let primary: Vec<_> = rule.primary.iter().map(|(s, _)| *s).collect();
            for (stat, _) in rule.secondary {
                assert!(!primary.contains(stat), "{category:?} assigns {stat:?} to both actors");
            }
            assert!(rule.team.iter().chain(rule.opponent.iter()).all(|s| s.is_team_stat()));
        }
    }

    #[test]
    fn test_neutral_categories_have_no_deltas() {
        for category in [
            EventCategory::Kickoff,
            EventCategory::Atmosphere,
            EventCategory::GeneralPlay,
            EventCategory::Halftime,
            EventCategory::Fulltime,
        ] {
            assert!(rule_for(category).is_empty());
            assert!(deltas_for(&EventDraft::new(category)).unwrap().is_empty());
        }
    }

    #[test]
    fn test_pass_complete_deltas() {
        let draft = EventDraft::new(EventCategory::PassComplete)
            .team(TeamSide::Home)
            .primary("qb")
            .secondary("wr")
            .yards(14);
        let deltas = deltas_for(&draft).unwrap();
        assert_eq!(deltas.len(), 5);
        assert!(deltas.contains(&StatDelta::player("qb", StatKind::PassingYards, 14)));
        assert!(deltas.contains(&StatDelta::player("wr", StatKind::ReceivingYards, 14)));
        assert!(deltas.contains(&StatDelta::player("wr", StatKind::Receptions, 1)));
    }

    #[test]
    fn test_power_tackle_adds_knockdown() {
        let soft = EventDraft::new(EventCategory::Tackle).team(TeamSide::Away).primary("lb").secondary("rb");
        let hard = soft.clone().power_hit(true);

        let soft_deltas = deltas_for(&soft).unwrap();
        assert_eq!(soft_deltas, vec![StatDelta::player("lb", StatKind::Tackles, 1)]);

        let hard_deltas = deltas_for(&hard).unwrap();
        assert_eq!(
            hard_deltas,
            vec![
                StatDelta::player("lb", StatKind::Tackles, 1),
                StatDelta::player("lb", StatKind::KnockdownsInflicted, 1),
            ]
        );
    }

    #[test]
    fn test_fumble_touches_only_tackler_and_carrier() {
        let draft = EventDraft::new(EventCategory::Fumble).team(TeamSide::Away).primary("lb").secondary("rb");
        let deltas = deltas_for(&draft).unwrap();
        let players: Vec<_> = deltas
            .iter()
            .filter_map(|d| match &d.target {
                StatTarget::Player(id) => Some(id.as_str()),
                StatTarget::Team(_) => None,
            })
            .collect();
        assert_eq!(players, vec!["lb", "rb"]);
        assert!(deltas.contains(&StatDelta::team(TeamSide::Home, StatKind::Turnovers, 1)));
    }

    #[test]
    fn test_score_credits_team() {
        let draft = EventDraft::new(EventCategory::Score).team(TeamSide::Away).primary("rb");
        let deltas = deltas_for(&draft).unwrap();
        assert_eq!(
            deltas,
            vec![
                StatDelta::player("rb", StatKind::Scores, 1),
                StatDelta::team(TeamSide::Away, StatKind::TeamScore, 1),
            ]
        );
    }

    #[test]
    fn test_missing_actor_is_reported() {
        let draft = EventDraft::new(EventCategory::Drop).team(TeamSide::Home).primary("qb");
        assert_eq!(
            deltas_for(&draft),
            Err(AttributionError::MissingActor { category: EventCategory::Drop, slot: "secondary" })
        );
        let draft = EventDraft::new(EventCategory::Score).primary("rb");
        assert_eq!(deltas_for(&draft), Err(AttributionError::MissingTeam(EventCategory::Score)));
    }
}
