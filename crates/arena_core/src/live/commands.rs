//! Messages understood by a match session.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::feed::{Subscription, ViewerId};
use crate::models::{MatchSnapshot, StatLedger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    Start,
    Pause,
    Resume,
    Terminate,
}

/// Outcome of a lifecycle request. A conflict is a benign no-op (starting a
/// running match, pausing a paused one) and carries the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum ControlOutcome {
    Applied,
    Conflict(String),
}

impl ControlOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ControlOutcome::Applied)
    }
}

/// Commands sent to a match session actor.
#[derive(Debug)]
pub enum SessionCommand {
    Control {
        action: ControlAction,
        responder: oneshot::Sender<ControlOutcome>,
    },
    Subscribe {
        viewer: ViewerId,
        responder: oneshot::Sender<Subscription>,
    },
    Unsubscribe {
        viewer: ViewerId,
        responder: oneshot::Sender<bool>,
    },
    Snapshot {
        responder: oneshot::Sender<MatchSnapshot>,
    },
    Ledger {
        responder: oneshot::Sender<StatLedger>,
    },
}
