//! Pacing controller: playback priority per event category.
//!
//! Pure function of the category. The simulation never reads it back.

use crate::models::{EventCategory, PacingDirective, PriorityTier};

pub fn tier_for(category: EventCategory) -> PriorityTier {
    match category {
        EventCategory::Score
        | EventCategory::Injury
        | EventCategory::Interception
        | EventCategory::Fumble
        | EventCategory::FumbleRecovery => PriorityTier::Critical,
        EventCategory::PassComplete
        | EventCategory::Tackle
        | EventCategory::Knockdown
        | EventCategory::Halftime
        | EventCategory::Fulltime => PriorityTier::Important,
        EventCategory::Kickoff
        | EventCategory::PassIncomplete
        | EventCategory::Drop
        | EventCategory::Run
        | EventCategory::SkillUse => PriorityTier::Standard,
        EventCategory::Atmosphere | EventCategory::GeneralPlay => PriorityTier::Downtime,
    }
}

pub fn directive_for(tier: PriorityTier) -> PacingDirective {
    match tier {
        PriorityTier::Critical => PacingDirective { tier, speed_multiplier: 1.0, visuals_required: true },
        PriorityTier::Important => PacingDirective { tier, speed_multiplier: 2.5, visuals_required: true },
        PriorityTier::Standard => PacingDirective { tier, speed_multiplier: 4.0, visuals_required: false },
        PriorityTier::Downtime => PacingDirective { tier, speed_multiplier: 8.0, visuals_required: false },
    }
}

pub fn classify(category: EventCategory) -> PacingDirective {
    directive_for(tier_for(category))
}

impl PriorityTier {
    /// Short banner label for text renderers.
    pub fn banner(&self) -> &'static str {
        match self {
            PriorityTier::Critical => "!!",
            PriorityTier::Important => "! ",
            PriorityTier::Standard => "  ",
            PriorityTier::Downtime => "..",
        }
    }
}
