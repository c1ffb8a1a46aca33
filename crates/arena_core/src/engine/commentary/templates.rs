//! Commentary template pools.
//!
//! Placeholders: `{player} {target} {team} {opponent} {yards} {home}
//! {away} {home_score} {away_score} {severity} {skill} {clock}`.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::models::{EventCategory, Race};

pub type Pool = &'static [&'static str];

const KICKOFF: Pool = &[
    "{player} sends the kickoff deep and {team} are under way!",
    "The whistle goes, {player} boots it high for {team}.",
    "Kickoff! {player} drives it toward the {opponent} end.",
    "{team} kick off through {player}, the crowd on its feet.",
    "And we're off, {player} with the kick for {team}.",
];

const SCORE: Pool = &[
    "SCORE! {player} crosses the line for {team}! {home} {home_score} - {away_score} {away}.",
    "{player} finds the end zone! {team} celebrate, it's {home_score}-{away_score}.",
    "Touch down by {player}! The {team} faithful erupt.",
    "{player} will not be denied, that's a score for {team}!",
    "Over the line goes {player}! {home} {home_score}, {away} {away_score}.",
    "{team} cash in, {player} with the finish!",
    "What a moment for {player}, {team} put points on the board!",
    "{player} dives across and {team} have it! {home_score}-{away_score}.",
];

const PASS_COMPLETE: Pool = &[
    "{player} finds {target} for a gain of {yards}.",
    "Nice throw by {player}, {target} hauls it in for {yards} yards.",
    "{player} threads the needle to {target}. Gain of {yards}.",
    "Quick release from {player}, {target} makes the catch.",
    "{target} snags the pass from {player} and picks up {yards}.",
    "Easy pitch and catch, {player} to {target}.",
    "{player} hits {target} in stride for {yards} yards.",
];

const PASS_LONG: Pool = &[
    "{player} launches it deep... {target} has it! A {yards}-yard strike!",
    "BOMB! {player} to {target} for {yards} yards!",
    "{target} is behind everyone and {player} finds him, huge gain of {yards}!",
    "Deep shot from {player}, {target} reels it in for {yards}!",
];

const PASS_INCOMPLETE: Pool = &[
    "{player}'s pass sails incomplete.",
    "{player} throws it away under pressure.",
    "Incomplete. {player} just overthrew it.",
    "{player} fires into traffic, nobody home.",
    "The pass from {player} falls harmlessly to the turf.",
    "{player} looks, throws... incomplete.",
];

const DROP: Pool = &[
    "{target} drops it! {player} put that right on the hands.",
    "Oh, {target} lets it slip through, a drop.",
    "{player} delivers, but {target} can't hold on.",
    "Dropped! {target} will want that one back.",
    "{target} bobbles the throw from {player} and it hits the ground.",
];

const RUN: Pool = &[
    "{player} carries for {yards}.",
    "{player} finds a seam and picks up {yards} yards.",
    "{player} plows ahead for {yards}.",
    "Hand-off to {player}, gain of {yards}.",
    "{player} bounces outside for {yards} yards.",
    "{player} grinds out {yards} for {team}.",
    "{player} keeps it and churns forward {yards}.",
];

const RUN_LONG: Pool = &[
    "{player} breaks free! A {yards}-yard breakaway!",
    "Look at {player} go! {yards} yards before anyone lays a hand on him!",
    "{player} is loose! Huge run of {yards}!",
    "BREAKAWAY! {player} slices through for {yards} yards!",
];

const RUN_LOSS: Pool = &[
    "{player} is dropped for a loss of {yards}.",
    "{player} gets swallowed up behind the line, minus {yards}.",
    "Nowhere to go for {player}, {yards} lost.",
    "{opponent} blow it up! {player} loses {yards} yards.",
    "{player} tries to bounce it and gives back {yards}.",
];

const TACKLE: Pool = &[
    "{player} brings down {target}.",
    "Solid stop by {player} on {target}.",
    "{player} wraps up {target}.",
    "{target} is dragged down by {player}.",
    "{player} closes fast and makes the tackle.",
    "Textbook tackle from {player}.",
];

const KNOCKDOWN: Pool = &[
    "{player} flattens {target}! What a hit!",
    "BOOM! {player} puts {target} on the ground.",
    "{target} never saw {player} coming. Knockdown!",
    "{player} lays out {target} with a crushing block.",
    "{target} is sent sprawling by {player}.",
];

const INTERCEPTION: Pool = &[
    "INTERCEPTED! {player} jumps the route on {target}'s throw!",
    "{player} picks it off! {team} take over!",
    "Turnover! {player} reads {target} all the way.",
    "{target} throws it right to {player}. Interception!",
    "What a pick by {player}!",
];

const FUMBLE: Pool = &[
    "FUMBLE! {player} punches it loose from {target}!",
    "{player} strips {target}, the ball is on the ground!",
    "{target} coughs it up after a big hit from {player}!",
    "Loose ball! {player} knocked it free from {target}!",
];

const FUMBLE_RECOVERY: Pool = &[
    "{player} falls on it! {team} ball!",
    "{player} scoops up the loose ball for {team}!",
    "Recovered by {player}, possession {team}.",
    "{player} pounces on the fumble!",
];

const INJURY: Pool = &[
    "{player} is down and staying down. Looks {severity}.",
    "Concern for {team} as {player} limps off, a {severity} injury.",
    "{player} is being checked by the medics, {severity} knock.",
    "Ouch. {player} took a heavy one, {severity} by the look of it.",
    "{player} is hurting, that's a {severity} injury for {team}.",
];

const SKILL_USE: Pool = &[
    "{player} calls on {skill}!",
    "{skill} from {player}, {team} get a lift!",
    "{player} unleashes {skill}.",
    "There's {skill}! {player} rallies {team}.",
    "{player} taps into {skill} at just the right time.",
];

const ATMOSPHERE: Pool = &[
    "The crowd is roaring for {team}.",
    "Chants of '{team}!' ring around the arena.",
    "Banners waving in the {home} end.",
    "The noise level rises, {home} {home_score} - {away_score} {away}.",
    "A wave rolls around the stands.",
    "Drums pounding from the {away} faithful.",
    "Both benches on their feet as play resets.",
    "{clock} on the clock, and the atmosphere is electric.",
];

const GENERAL_PLAY: Pool = &[
    "Players reset at the line.",
    "Both sides jostling for position.",
    "A bit of a scramble, nothing comes of it.",
    "{team} regroup.",
    "The action settles for a moment.",
    "Play continues around midfield.",
];

const HALFTIME: Pool = &[
    "That's the half! {home} {home_score} - {away_score} {away}.",
    "Halftime whistle. {home} {home_score}, {away} {away_score}.",
    "The teams head in at the break, {home_score}-{away_score}.",
    "Halftime. Plenty to talk about in both locker rooms.",
];

const FULLTIME: Pool = &[
    "FULL TIME! {home} {home_score} - {away_score} {away}.",
    "That's it! Final score: {home} {home_score}, {away} {away_score}.",
    "The final whistle blows. {home_score}-{away_score}.",
    "It's all over! {home} {home_score}, {away} {away_score}.",
];

pub fn neutral_pool(category: EventCategory) -> Pool {
    match category {
        EventCategory::Kickoff => KICKOFF,
        EventCategory::Score => SCORE,
        EventCategory::PassComplete => PASS_COMPLETE,
        EventCategory::PassIncomplete => PASS_INCOMPLETE,
        EventCategory::Drop => DROP,
        EventCategory::Run => RUN,
        EventCategory::Tackle => TACKLE,
        EventCategory::Knockdown => KNOCKDOWN,
        EventCategory::Interception => INTERCEPTION,
        EventCategory::Fumble => FUMBLE,
        EventCategory::FumbleRecovery => FUMBLE_RECOVERY,
        EventCategory::Injury => INJURY,
        EventCategory::SkillUse => SKILL_USE,
        EventCategory::Atmosphere => ATMOSPHERE,
        EventCategory::GeneralPlay => GENERAL_PLAY,
        EventCategory::Halftime => HALFTIME,
        EventCategory::Fulltime => FULLTIME,
    }
}

/// Breakaway pools, used when a gain is flagged long.
pub fn long_gain_pool(category: EventCategory) -> Option<Pool> {
    match category {
        EventCategory::Run => Some(RUN_LONG),
        EventCategory::PassComplete => Some(PASS_LONG),
        _ => None,
    }
}

/// Pools for plays that lost ground. Takes precedence over race and
/// breakaway flavor.
pub fn loss_pool(category: EventCategory) -> Option<Pool> {
    match category {
        EventCategory::Run => Some(RUN_LOSS),
        _ => None,
    }
}

// ============================================================================
// Race-flavored pools
// ============================================================================

static RACE_POOLS: Lazy<HashMap<(EventCategory, Race), Pool>> = Lazy::new(|| {
    let mut pools: HashMap<(EventCategory, Race), Pool> = HashMap::new();

    pools.insert((EventCategory::Score, Race::Human), &[
        "{player} shows that Human grit, score for {team}!",
        "Heart of a champion! {player} powers in for {team}.",
    ]);
    pools.insert((EventCategory::Score, Race::Sylvan), &[
        "Swift as the forest wind, {player} glides in to score!",
        "{player} dances through like a leaf on the breeze, score!",
    ]);
    pools.insert((EventCategory::Score, Race::Gryll), &[
        "{player} rumbles in like a landslide! Gryll power!",
        "Nothing stops a charging Gryll, {player} scores!",
    ]);
    pools.insert((EventCategory::Score, Race::Lumina), &[
        "{player} blazes in, radiant as the dawn!",
        "A beam of light through the defense, {player} scores for {team}!",
    ]);
    pools.insert((EventCategory::Score, Race::Umbra), &[
        "{player} slips out of the shadows and into the end zone!",
        "Where did {player} come from? Umbra stealth, score!",
    ]);

    pools.insert((EventCategory::Run, Race::Sylvan), &[
        "{player} flits past defenders with Sylvan grace for {yards}.",
        "Light on the feet, {player} darts {yards} yards.",
    ]);
    pools.insert((EventCategory::Run, Race::Gryll), &[
        "{player} bulldozes ahead, bodies flying, {yards} yards.",
        "The ground shakes as {player} rumbles for {yards}.",
    ]);
    pools.insert((EventCategory::Run, Race::Umbra), &[
        "{player} melts through a gap only shadows could find, {yards} yards.",
        "Now you see {player}, now you don't. {yards} yard gain.",
    ]);

    pools.insert((EventCategory::PassComplete, Race::Lumina), &[
        "{player} threads a shining spiral to {target} for {yards}.",
        "Luminous accuracy from {player}, {target} gains {yards}.",
    ]);
    pools.insert((EventCategory::PassComplete, Race::Human), &[
        "{player} stays cool and hits {target} for {yards}.",
        "Veteran poise from {player}, complete to {target}.",
    ]);

    pools.insert((EventCategory::Tackle, Race::Gryll), &[
        "{player} lowers the horns and buries {target}!",
        "Gryll strength! {player} drives {target} into the turf.",
    ]);
    pools.insert((EventCategory::Tackle, Race::Umbra), &[
        "{player} strikes from the shadows to drop {target}.",
        "{target} is swallowed up by {player}.",
    ]);

    pools.insert((EventCategory::Knockdown, Race::Gryll), &[
        "{player} hits {target} like a falling boulder!",
        "A thunderous Gryll hit, {target} is flattened by {player}!",
    ]);

    pools.insert((EventCategory::SkillUse, Race::Lumina), &[
        "{player} glows brightly, {skill} washes over {team}!",
        "Radiance spreads from {player}, {team} feel refreshed!",
    ]);
    pools.insert((EventCategory::SkillUse, Race::Sylvan), &[
        "{player} draws on the old forest, {skill}!",
    ]);

    pools
});

pub fn race_pool(category: EventCategory, race: Race) -> Option<Pool> {
    RACE_POOLS.get(&(category, race)).copied()
}
