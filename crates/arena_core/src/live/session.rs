//! Actor owning one running match.
//!
//! The session is the only code that touches its [`MatchEngine`]: ticks and
//! commands are processed one at a time from a single `select!` loop, so a
//! snapshot taken for a new subscriber can never interleave with a tick.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::commands::{ControlAction, ControlOutcome, SessionCommand};
use super::feed::{Broadcaster, MatchFeed, Subscription, ViewerId};
use super::handle::MatchHandle;
use super::sink::ResultSink;
use crate::engine::match_sim::MatchEngine;
use crate::error::{ControlConflict, PersistError};
use crate::models::{EventCategory, MatchEvent, MatchResult, MatchSnapshot, MatchStatus};

/// Final state of a match, kept after its session has stopped.
#[derive(Debug, Clone)]
pub struct CompletedMatch {
    pub snapshot: MatchSnapshot,
    pub result: MatchResult,
}

/// Live handles and finished matches. Owned by the registry; sessions only
/// hold a weak reference, so dropping the last registry clone drops every
/// handle and each session sees its command channel close.
#[derive(Default)]
pub struct Directory {
    pub live: RwLock<HashMap<String, MatchHandle>>,
    pub completed: RwLock<HashMap<String, CompletedMatch>>,
}

impl Directory {
    /// Moves a match from live to completed. The completed entry is written
    /// first so a lookup never finds neither.
    fn retire(&self, match_id: &str, done: CompletedMatch) {
        self.completed.write().insert(match_id.to_string(), done);
        self.live.write().remove(match_id);
    }
}

pub struct MatchSession {
    engine: MatchEngine,
    viewers: Broadcaster,
    sink: Arc<dyn ResultSink>,
    directory: Weak<Directory>,
    feed_buffer: usize,
}

impl MatchSession {
    pub fn new(engine: MatchEngine, sink: Arc<dyn ResultSink>, directory: Weak<Directory>, feed_buffer: usize) -> Self {
        Self { engine, viewers: Broadcaster::new(), sink, directory, feed_buffer: feed_buffer.max(1) }
    }

    fn ticking(&self) -> bool {
        self.engine.status().is_running() && !self.engine.is_paused()
    }

    /// One clock step. Returns false once the match is over.
    async fn step(&mut self) -> bool {
        let events = self.engine.tick();
        self.publish(&events).await;
        if self.engine.status() == MatchStatus::Completed {
            self.complete().await;
            return false;
        }
        true
    }

    async fn publish(&mut self, events: &[MatchEvent]) {
        if events.is_empty() {
            return;
        }
        let engine = &self.engine;
        self.viewers.broadcast(events, || engine.snapshot());

        if events.iter().any(|e| e.category == EventCategory::Halftime) {
            let sink = Arc::clone(&self.sink);
            let snapshot = self.engine.snapshot();
            persist(self.engine.id(), "halftime checkpoint", move || sink.checkpoint(&snapshot)).await;
        }
    }

    /// Records the result, retires the match, then sends `Final`. A viewer
    /// holding `Final` can always find the result in the registry and sink.
    async fn complete(&mut self) {
        let snapshot = self.engine.snapshot();
        let Some(result) = self.engine.result() else {
            self.viewers.finish(&snapshot);
            return;
        };

        let sink = Arc::clone(&self.sink);
        let stored = result.clone();
        persist(self.engine.id(), "recording result", move || sink.record(&stored)).await;
        info!(match_id = %self.engine.id(), summary = %result.summary_line(), "session finished");

        let final_snapshot = snapshot.clone();
        match self.directory.upgrade() {
            Some(directory) => directory.retire(self.engine.id(), CompletedMatch { snapshot, result }),
            None => debug!(match_id = %self.engine.id(), "registry gone, result kept only by the sink"),
        }
        self.viewers.finish(&final_snapshot);
    }

    async fn control(&mut self, action: ControlAction) -> ControlOutcome {
        let outcome: Result<Vec<MatchEvent>, ControlConflict> = match action {
            ControlAction::Start => self.engine.start(),
            ControlAction::Pause => self.engine.pause().map(|_| Vec::new()),
            ControlAction::Resume => self.engine.resume().map(|_| Vec::new()),
            ControlAction::Terminate => self.engine.terminate(),
        };
        match outcome {
            Ok(events) => {
                self.publish(&events).await;
                ControlOutcome::Applied
            }
            Err(conflict) => {
                debug!(match_id = %self.engine.id(), ?action, %conflict, "control conflict");
                ControlOutcome::Conflict(conflict.to_string())
            }
        }
    }

    fn subscribe(&mut self, viewer: ViewerId) -> Subscription {
        let snapshot = self.engine.snapshot();
        let (tx, rx) = mpsc::channel(self.feed_buffer);
        self.viewers.add(viewer.clone(), tx, snapshot.last_sequence);
        debug!(match_id = %self.engine.id(), %viewer, viewers = self.viewers.len(), "viewer subscribed");
        Subscription { snapshot, feed: rx }
    }

    /// Handles a single command. Returns false once the session should stop.
    /// A control that ends the match is answered after the result is stored.
    async fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Control { action, responder } => {
                let outcome = self.control(action).await;
                let finished = self.engine.status() == MatchStatus::Completed;
                if finished {
                    self.complete().await;
                }
                let _ = responder.send(outcome);
                if finished {
                    return false;
                }
            }
            SessionCommand::Subscribe { viewer, responder } => {
                let subscription = self.subscribe(viewer);
                let _ = responder.send(subscription);
            }
            SessionCommand::Unsubscribe { viewer, responder } => {
                let removed = self.viewers.remove(&viewer);
                let _ = responder.send(removed);
            }
            SessionCommand::Snapshot { responder } => {
                let _ = responder.send(self.engine.snapshot());
            }
            SessionCommand::Ledger { responder } => {
                let _ = responder.send(self.engine.ledger().clone());
            }
        }
        true
    }

    /// Every handle is gone: end the match so its result is still recorded.
    async fn abandon(&mut self) {
        if self.engine.status() != MatchStatus::Completed {
            let events = self.engine.terminate().unwrap_or_default();
            self.publish(&events).await;
        }
        self.complete().await;
    }
}

/// Sink calls may block on disk IO, so they run on the blocking pool. The
/// session waits for them, which keeps checkpoint and result ordered.
async fn persist<F>(match_id: &str, what: &'static str, call: F)
where
    F: FnOnce() -> Result<(), PersistError> + Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(%match_id, error = %err, "{what} failed"),
        Err(err) => warn!(%match_id, error = %err, "{what} task did not finish"),
    }
}

/// Spawns the session actor. Ticks run every `tick_interval` while the match
/// is running and not paused.
pub fn spawn_session(session: MatchSession, receiver: mpsc::Receiver<SessionCommand>, tick_interval: Duration) {
    tokio::spawn(async move {
        run_session_loop(session, receiver, tick_interval).await;
    });
}

async fn run_session_loop(mut session: MatchSession, mut receiver: mpsc::Receiver<SessionCommand>, tick_interval: Duration) {
    let match_id = session.engine.id().to_string();
    debug!(%match_id, "match session started");

    let mut ticker = tokio::time::interval(tick_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let ticking = session.ticking();
        tokio::select! {
            command = receiver.recv() => match command {
                Some(command) => {
                    if !session.handle_command(command).await {
                        break;
                    }
                }
                None => {
                    session.abandon().await;
                    break;
                }
            },
            _ = ticker.tick(), if ticking => {
                if !session.step().await {
                    break;
                }
            }
        }
    }

    debug!(%match_id, "match session stopped");
}

/// Feed for a viewer joining a finished match: the final snapshot, then
/// the end of the stream.
pub fn final_subscription(done: &CompletedMatch) -> Subscription {
    let (tx, rx) = mpsc::channel(1);
    let _ = tx.try_send(MatchFeed::Final(done.snapshot.clone()));
    Subscription { snapshot: done.snapshot.clone(), feed: rx }
}
