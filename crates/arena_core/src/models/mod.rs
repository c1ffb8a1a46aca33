pub mod events;
pub mod fixtures;
pub mod ledger;
pub mod match_result;
pub mod player;
pub mod snapshot;
pub mod status;
pub mod team;

pub use events::{
    EventCategory, MatchEvent, PacingDirective, PriorityTier, StatDelta, StatKind, StatTarget,
};
pub use ledger::{PlayerLine, PlayerStats, StatLedger, TeamStats};
pub use match_result::{mvp_candidates, winner_of, MatchResult, MvpCandidate};
pub use player::{Attribute, Attributes, FieldPosition, InjuryState, Player, Race, Role};
pub use snapshot::{MatchSnapshot, PlayerView, TeamView};
pub use status::{MatchKind, MatchStatus};
pub use team::{Formation, Team, TeamSide};
