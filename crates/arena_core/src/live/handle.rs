//! Handle for communicating with a match session actor.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::commands::{ControlAction, ControlOutcome, SessionCommand};
use super::feed::{Subscription, ViewerId};
use crate::error::RegistryError;
use crate::models::{MatchSnapshot, StatLedger};

/// Cheap to clone; every clone talks to the same session.
#[derive(Clone)]
pub struct MatchHandle {
    match_id: Arc<str>,
    sender: mpsc::Sender<SessionCommand>,
    controllers: Arc<[ViewerId]>,
}

impl MatchHandle {
    pub fn new(match_id: &str, sender: mpsc::Sender<SessionCommand>, controllers: Vec<ViewerId>) -> Self {
        Self { match_id: Arc::from(match_id), sender, controllers: Arc::from(controllers) }
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    /// An empty controller list lets any viewer control the match.
    pub fn may_control(&self, viewer: &ViewerId) -> bool {
        self.controllers.is_empty() || self.controllers.contains(viewer)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand) -> Result<T, RegistryError> {
        let (responder, rx) = oneshot::channel();
        self.sender
            .send(build(responder))
            .await
            .map_err(|_| RegistryError::SessionClosed(self.match_id.to_string()))?;
        rx.await.map_err(|_| RegistryError::SessionClosed(self.match_id.to_string()))
    }

    pub async fn control(&self, action: ControlAction) -> Result<ControlOutcome, RegistryError> {
        self.request(|responder| SessionCommand::Control { action, responder }).await
    }

    /// # Errors
    /// - `RegistryError::SessionClosed` - the match finished in the meantime
    pub async fn subscribe(&self, viewer: ViewerId) -> Result<Subscription, RegistryError> {
        self.request(|responder| SessionCommand::Subscribe { viewer, responder }).await
    }

    pub async fn unsubscribe(&self, viewer: ViewerId) -> Result<bool, RegistryError> {
        self.request(|responder| SessionCommand::Unsubscribe { viewer, responder }).await
    }

    pub async fn snapshot(&self) -> Result<MatchSnapshot, RegistryError> {
        self.request(|responder| SessionCommand::Snapshot { responder }).await
    }

    pub async fn ledger(&self) -> Result<StatLedger, RegistryError> {
        self.request(|responder| SessionCommand::Ledger { responder }).await
    }
}
