use thiserror::Error;

use crate::models::TeamSide;

/// Roster / match-setup validation failures. Nothing is created when one of
/// these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("Invalid team size for {team}: expected {expected}, found {found}")]
    InvalidTeamSize { team: String, expected: usize, found: usize },

    #[error("Formation {formation} needs {expected} {role} player(s) in {team}, found {found}")]
    FormationMismatch {
        team: String,
        formation: String,
        role: String,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate player id: {0}")]
    DuplicatePlayer(String),

    #[error("Invalid player {player}: {reason}")]
    InvalidPlayer { player: String, reason: String },

    #[error("Invalid team {team}: {reason}")]
    InvalidTeam { team: String, reason: String },

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for MatchError {
    fn from(err: serde_json::Error) -> Self {
        MatchError::Deserialization(err.to_string())
    }
}

/// Stat ledger mutation failures. Always recovered inside the tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Ledger is frozen")]
    Frozen,

    #[error("Unknown player in ledger: {0}")]
    UnknownPlayer(String),

    #[error("Unknown team side: {0:?}")]
    UnknownTeam(TeamSide),
}

/// Registry-level errors, the only errors that reach external callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Match not found: {0}")]
    NotFound(String),

    #[error("Invalid roster: {0}")]
    InvalidRoster(#[from] MatchError),

    #[error("Registry at capacity: {active} active matches (limit {limit})")]
    CapacityExhausted { active: usize, limit: usize },

    #[error("Viewer {viewer} is not allowed to control match {match_id}")]
    Unauthorized { match_id: String, viewer: String },

    #[error("Match session closed: {0}")]
    SessionClosed(String),
}

/// Lifecycle requests that do not apply in the current state. Benign:
/// the registry reports them as a conflict and nothing changes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlConflict {
    #[error("match already started")]
    AlreadyStarted,

    #[error("match has not started yet")]
    NotStarted,

    #[error("match is already paused")]
    AlreadyPaused,

    #[error("match is not paused")]
    NotPaused,

    #[error("match already finished")]
    Finished,
}

/// Persistence hook failures. Logged by the session, never fatal to a match.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl RegistryError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            RegistryError::NotFound(_) => false,
            RegistryError::InvalidRoster(_) => false,
            RegistryError::CapacityExhausted { .. } => true,
            RegistryError::Unauthorized { .. } => false,
            RegistryError::SessionClosed(_) => true,
        }
    }
}
