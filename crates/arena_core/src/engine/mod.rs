pub mod attribution;
pub mod batch;
pub mod commentary;
pub mod config;
pub mod draft;
pub mod match_sim;
pub mod pacing;
pub mod performance;

pub use attribution::{deltas_for, rule_for, AttributionRule};
pub use batch::{simulate_many, summarize_many, BatchSummary};
pub use commentary::{CommentaryContext, CommentarySelector};
pub use config::EngineConfig;
pub use draft::EventDraft;
pub use match_sim::MatchEngine;
pub use pacing::classify;
pub use performance::{effective_attribute, race_profile, PerformanceContext};
