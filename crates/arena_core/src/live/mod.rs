//! Live hosting: one actor per running match, a registry that owns them and
//! snapshot-first feeds for spectators.

mod commands;
mod feed;
mod handle;
mod registry;
mod session;
mod sink;

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::MatchKind;

pub use commands::{ControlAction, ControlOutcome};
pub use feed::{MatchFeed, Subscription, ViewerId};
pub use handle::MatchHandle;
pub use registry::MatchRegistry;
pub use session::CompletedMatch;
pub use sink::{JsonFileResultSink, MemoryResultSink, ResultSink};

/// Registry tuning. Every field has a default, so a partial YAML/JSON block
/// is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LiveConfig {
    /// Wall-clock time between two ticks of a running match (default: 1000)
    pub tick_interval_ms: u64,
    /// Items a viewer may fall behind before it is resynced with a snapshot (default: 64)
    pub feed_buffer: usize,
    /// Pending commands per match session (default: 32)
    pub command_buffer: usize,
    /// Live matches allowed at once (default: 256)
    pub max_active_matches: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self { tick_interval_ms: 1000, feed_buffer: 64, command_buffer: 32, max_active_matches: 256 }
    }
}

impl LiveConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Per-match settings beyond the two rosters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MatchOptions {
    pub kind: MatchKind,
    /// Fixed seed for a reproducible match; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Viewers allowed to use `control_as`. Empty means anyone.
    pub controllers: Vec<ViewerId>,
}
