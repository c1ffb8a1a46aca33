//! Demo rosters for the CLI, benches and tests.

use super::player::{Attributes, Player, Race, Role};
use super::team::{Formation, Team};

const FIRST_NAMES: [&str; 12] = [
    "Kara", "Thorne", "Ilys", "Brok", "Senna", "Varo", "Mira", "Grett", "Oren", "Lyss", "Dax",
    "Nym",
];
const LAST_NAMES: [&str; 12] = [
    "Vell", "Ashgrove", "Stonehide", "Dawnmere", "Quill", "Morrow", "Hale", "Brightwater",
    "Gloam", "Tarn", "Kestrel", "Voss",
];

/// Builds a valid `Standard` formation team. `variant` rotates races, names
/// and attribute spreads so two demo teams differ.
pub fn demo_team(id: &str, name: &str, variant: usize) -> Team {
    let slots = [
        (Role::Passer, "passer"),
        (Role::Runner, "runner1"),
        (Role::Runner, "runner2"),
        (Role::Blocker, "blocker1"),
        (Role::Blocker, "blocker2"),
        (Role::Wildcard, "wildcard"),
    ];

    let players = slots
        .iter()
        .enumerate()
        .map(|(idx, (role, slot))| {
            let race = Race::ALL[(idx + variant) % Race::ALL.len()];
            let name_idx = (idx * 5 + variant * 7) % FIRST_NAMES.len();
            let display = format!("{} {}", FIRST_NAMES[name_idx], LAST_NAMES[(name_idx + idx) % LAST_NAMES.len()]);
            Player::new(format!("{id}-{slot}"), display, race, *role, role_attributes(*role, variant))
        })
        .collect();

    Team {
        id: id.to_string(),
        name: name.to_string(),
        formation: Formation::Standard,
        players,
        camaraderie: 50 + (variant as u8 % 5) * 8,
    }
}

fn role_attributes(role: Role, variant: usize) -> Attributes {
    let tweak = (variant % 4) as u8;
    let mut attrs = Attributes::uniform(18 + tweak);
    match role {
        Role::Passer => {
            attrs.throwing = 34 + tweak;
            attrs.leadership = 30;
            attrs.agility = 22;
        }
        Role::Runner => {
            attrs.speed = 33 + tweak;
            attrs.agility = 30;
            attrs.catching = 28;
        }
        Role::Blocker => {
            attrs.power = 32 + tweak;
            attrs.stamina = 30;
            attrs.speed = 15;
        }
        Role::Wildcard => {
            attrs.kicking = 30;
            attrs.catching = 26;
            attrs.power = 24 + tweak;
            attrs.speed = 26;
        }
    }
    attrs
}

/// Home/away pair of valid, distinct demo teams.
pub fn demo_pair() -> (Team, Team) {
    (demo_team("home", "Ironclad Wardens", 0), demo_team("away", "Gloamwood Stalkers", 3))
}
