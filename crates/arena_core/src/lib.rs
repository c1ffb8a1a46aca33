//! # arena_core - Fantasy Sports Match Simulation Engine
//!
//! Turns two rosters of attributed players into a timed, event-by-event
//! contest, narrates it, keeps the stat ledger in step with every narrated
//! event and streams live state to any number of spectators.
//!
//! ## Features
//! - Tick-driven match state machine with seeded randomness
//! - Attribution-table stat ledger (every delta comes from one rule per category)
//! - Race-flavored commentary and pacing tiers for renderers
//! - Async match registry with snapshot-first viewer subscriptions

// Game engine APIs often require many parameters for state, rng, config, etc.
#![allow(clippy::too_many_arguments)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]

pub mod engine;
pub mod error;
pub mod live;
pub mod models;

pub use engine::config::EngineConfig;
pub use engine::match_sim::{MatchEngine, MatchKind, MatchStatus};
pub use error::{ConfigError, ControlConflict, LedgerError, MatchError, PersistError, RegistryError};
pub use live::{
    ControlAction, ControlOutcome, LiveConfig, MatchFeed, MatchOptions, MatchRegistry,
    Subscription, ViewerId,
};
pub use models::{
    Attribute, EventCategory, MatchEvent, MatchResult, MatchSnapshot, Player, Race, Role,
    StatLedger, Team, TeamSide,
};
