//! Match registry: the single owner of every match the process hosts.
//!
//! Live matches are reachable through a [`MatchHandle`] kept in a shared map;
//! finished ones move to a second map holding their final snapshot and
//! result. All reads hand out clones.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use super::commands::{ControlAction, ControlOutcome};
use super::feed::{Subscription, ViewerId};
use super::handle::MatchHandle;
use super::session::{final_subscription, spawn_session, CompletedMatch, Directory, MatchSession};
use super::sink::{MemoryResultSink, ResultSink};
use super::{LiveConfig, MatchOptions};
use crate::engine::config::EngineConfig;
use crate::engine::match_sim::MatchEngine;
use crate::error::{ControlConflict, RegistryError};
use crate::models::{MatchKind, MatchResult, MatchSnapshot, StatLedger, Team};

/// Cloning shares the same registry. Dropping the last clone terminates
/// every live match; each result still reaches the sink.
#[derive(Clone)]
pub struct MatchRegistry {
    config: LiveConfig,
    engine_config: EngineConfig,
    sink: Arc<dyn ResultSink>,
    directory: Arc<Directory>,
}

enum Lookup {
    Live(MatchHandle),
    Done(CompletedMatch),
}

impl MatchRegistry {
    /// Registry with the default engine tuning and an in-memory sink.
    pub fn new(config: LiveConfig) -> Self {
        Self::with_sink(config, EngineConfig::default(), Arc::new(MemoryResultSink::new()))
    }

    pub fn with_sink(config: LiveConfig, engine_config: EngineConfig, sink: Arc<dyn ResultSink>) -> Self {
        Self { config, engine_config, sink, directory: Arc::new(Directory::default()) }
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Creates a match in `Preparing` and returns its id. Must be called
    /// from within a Tokio runtime.
    ///
    /// # Errors
    /// - `RegistryError::InvalidRoster` - a roster failed validation
    /// - `RegistryError::CapacityExhausted` - too many live matches
    pub fn create_match(&self, home: Team, away: Team, is_exhibition: bool) -> Result<String, RegistryError> {
        let options = MatchOptions { kind: MatchKind::from_exhibition_flag(is_exhibition), ..MatchOptions::default() };
        self.create_match_with(home, away, options)
    }

    pub fn create_match_with(&self, home: Team, away: Team, options: MatchOptions) -> Result<String, RegistryError> {
        let limit = self.config.max_active_matches;
        let active = self.active_count();
        if active >= limit {
            return Err(RegistryError::CapacityExhausted { active, limit });
        }

        let match_id = Uuid::new_v4().to_string();
        let engine = MatchEngine::new(&match_id, home, away, options.kind, self.engine_config.clone(), options.seed)?;
        let seed = engine.seed();

        let (sender, receiver) = mpsc::channel(self.config.command_buffer.max(1));
        let handle = MatchHandle::new(&match_id, sender, options.controllers);
        {
            // capacity is decided under the write guard
            let mut live = self.directory.live.write();
            if live.len() >= limit {
                return Err(RegistryError::CapacityExhausted { active: live.len(), limit });
            }
            live.insert(match_id.clone(), handle);
        }

        let session =
            MatchSession::new(engine, Arc::clone(&self.sink), Arc::downgrade(&self.directory), self.config.feed_buffer);
        spawn_session(session, receiver, self.config.tick_interval());

        info!(%match_id, seed, kind = ?options.kind, "match created");
        Ok(match_id)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    fn lookup(&self, match_id: &str) -> Result<Lookup, RegistryError> {
        if let Some(handle) = self.directory.live.read().get(match_id) {
            return Ok(Lookup::Live(handle.clone()));
        }
        self.completed(match_id)
    }

    fn completed(&self, match_id: &str) -> Result<Lookup, RegistryError> {
        self.directory
            .completed
            .read()
            .get(match_id)
            .cloned()
            .map(Lookup::Done)
            .ok_or_else(|| RegistryError::NotFound(match_id.to_string()))
    }

    /// Runs `live` against the session, falling back to the completed entry
    /// when the session has stopped in the meantime.
    async fn query<T, F, Fut>(
        &self,
        match_id: &str,
        live: F,
        done: impl Fn(CompletedMatch) -> T,
    ) -> Result<T, RegistryError>
    where
        F: FnOnce(MatchHandle) -> Fut,
        Fut: std::future::Future<Output = Result<T, RegistryError>>,
    {
        match self.lookup(match_id)? {
            Lookup::Done(finished) => Ok(done(finished)),
            Lookup::Live(handle) => match live(handle).await {
                Err(RegistryError::SessionClosed(_)) => match self.completed(match_id)? {
                    Lookup::Done(finished) => Ok(done(finished)),
                    Lookup::Live(_) => Err(RegistryError::SessionClosed(match_id.to_string())),
                },
                other => other,
            },
        }
    }

    pub fn active_count(&self) -> usize {
        self.directory.live.read().len()
    }

    pub fn live_matches(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.directory.live.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn contains(&self, match_id: &str) -> bool {
        self.directory.live.read().contains_key(match_id) || self.directory.completed.read().contains_key(match_id)
    }

    // ========================================================================
    // Control
    // ========================================================================

    pub async fn control(&self, match_id: &str, action: ControlAction) -> Result<ControlOutcome, RegistryError> {
        let finished = || ControlOutcome::Conflict(ControlConflict::Finished.to_string());
        self.query(match_id, |h| async move { h.control(action).await }, |_| finished()).await
    }

    /// Like [`control`](Self::control), but only for the match's controllers.
    ///
    /// # Errors
    /// - `RegistryError::Unauthorized` - viewer is not a controller
    pub async fn control_as(
        &self,
        match_id: &str,
        viewer: &ViewerId,
        action: ControlAction,
    ) -> Result<ControlOutcome, RegistryError> {
        if let Lookup::Live(handle) = self.lookup(match_id)? {
            if !handle.may_control(viewer) {
                warn!(%match_id, %viewer, ?action, "unauthorized control attempt");
                return Err(RegistryError::Unauthorized { match_id: match_id.to_string(), viewer: viewer.to_string() });
            }
        }
        self.control(match_id, action).await
    }

    pub async fn start_match(&self, match_id: &str) -> Result<ControlOutcome, RegistryError> {
        self.control(match_id, ControlAction::Start).await
    }

    pub async fn pause_match(&self, match_id: &str) -> Result<ControlOutcome, RegistryError> {
        self.control(match_id, ControlAction::Pause).await
    }

    pub async fn resume_match(&self, match_id: &str) -> Result<ControlOutcome, RegistryError> {
        self.control(match_id, ControlAction::Resume).await
    }

    pub async fn terminate_match(&self, match_id: &str) -> Result<ControlOutcome, RegistryError> {
        self.control(match_id, ControlAction::Terminate).await
    }

    // ========================================================================
    // Viewers and queries
    // ========================================================================

    /// Snapshot first, then every later event. Joining a finished match
    /// yields its final snapshot and a feed holding only `Final`.
    pub async fn subscribe(&self, match_id: &str, viewer: ViewerId) -> Result<Subscription, RegistryError> {
        self.query(match_id, |h| async move { h.subscribe(viewer).await }, |done| final_subscription(&done))
            .await
    }

    /// Returns whether the viewer was subscribed. The match keeps running
    /// without viewers.
    pub async fn unsubscribe(&self, match_id: &str, viewer: ViewerId) -> Result<bool, RegistryError> {
        self.query(match_id, |h| async move { h.unsubscribe(viewer).await }, |_| false).await
    }

    pub async fn snapshot(&self, match_id: &str) -> Result<MatchSnapshot, RegistryError> {
        self.query(match_id, |h| async move { h.snapshot().await }, |done| done.snapshot).await
    }

    /// Live ledger, or the frozen final one.
    pub async fn ledger(&self, match_id: &str) -> Result<StatLedger, RegistryError> {
        self.query(match_id, |h| async move { h.ledger().await }, |done| done.result.ledger).await
    }

    /// Final result, `None` while the match is still live.
    pub fn result(&self, match_id: &str) -> Result<Option<MatchResult>, RegistryError> {
        match self.lookup(match_id)? {
            Lookup::Live(_) => Ok(None),
            Lookup::Done(done) => Ok(Some(done.result)),
        }
    }

    /// Terminates every live match. Each viewer gets a `Final` snapshot and
    /// each result reaches the sink.
    pub async fn shutdown(&self) {
        let handles: Vec<MatchHandle> = self.directory.live.read().values().cloned().collect();
        info!(live = handles.len(), "shutting down match registry");
        for handle in handles {
            if let Err(err) = handle.control(ControlAction::Terminate).await {
                warn!(match_id = %handle.match_id(), error = %err, "terminate during shutdown failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::{MatchError, PersistError};
    use crate::live::{MatchFeed, MemoryResultSink};
    use crate::models::fixtures::demo_pair;
    use crate::models::{MatchEvent, MatchStatus};

    /// Holds every `record` call until the test releases it.
    struct GatedSink {
        gate: parking_lot::Mutex<std::sync::mpsc::Receiver<()>>,
        inner: MemoryResultSink,
    }

    impl ResultSink for GatedSink {
        fn checkpoint(&self, snapshot: &MatchSnapshot) -> Result<(), PersistError> {
            self.inner.checkpoint(snapshot)
        }

        fn record(&self, result: &MatchResult) -> Result<(), PersistError> {
            let _ = self.gate.lock().recv();
            self.inner.record(result)
        }
    }

    fn registry() -> MatchRegistry {
        MatchRegistry::new(LiveConfig { tick_interval_ms: 10, ..LiveConfig::default() })
    }

    fn seeded(seed: u64) -> MatchOptions {
        MatchOptions { seed: Some(seed), ..MatchOptions::default() }
    }

    /// Drains a feed until `Final`, returning the events seen.
    async fn drain(sub: &mut Subscription) -> (Vec<MatchEvent>, MatchSnapshot) {
        let mut events = Vec::new();
        while let Some(item) = sub.feed.recv().await {
            match item {
                MatchFeed::Event(event) => events.push(event),
                MatchFeed::Snapshot(_) => panic!("unexpected resync on a roomy feed"),
                MatchFeed::Final(snapshot) => return (events, snapshot),
            }
        }
        panic!("feed closed without a final snapshot");
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_match_streams_every_event_once() {
        let registry = registry();
        let (home, away) = demo_pair();
        let id = registry.create_match_with(home, away, seeded(11)).unwrap();

        let mut sub = registry.subscribe(&id, ViewerId::from("fan")).await.unwrap();
        assert_eq!(sub.snapshot.status, MatchStatus::Preparing);
        assert!(registry.start_match(&id).await.unwrap().is_applied());

        let (events, final_snapshot) = drain(&mut sub).await;
        assert_eq!(final_snapshot.status, MatchStatus::Completed);
        assert!(events.windows(2).all(|w| w[1].sequence == w[0].sequence + 1));
        assert!(events.iter().all(|e| e.sequence > sub.snapshot.last_sequence));
        assert_eq!(events.last().map(|e| e.sequence), Some(final_snapshot.last_sequence));

        let replayed = sub.snapshot.replay(&events);
        assert_eq!(replayed.players, final_snapshot.ledger.players);
        assert_eq!(replayed.score(), final_snapshot.score());

        let result = registry.result(&id).unwrap().expect("result after final");
        assert_eq!((result.home_score, result.away_score), final_snapshot.score());
        assert_eq!(registry.active_count(), 0);
        assert!(registry.live_matches().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_subscriber_starts_from_snapshot() {
        let registry = registry();
        let (home, away) = demo_pair();
        let id = registry.create_match_with(home, away, seeded(5)).unwrap();
        registry.start_match(&id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let mut sub = registry.subscribe(&id, ViewerId::from("late")).await.unwrap();
        assert!(sub.snapshot.last_sequence >= 1);
        assert!(sub.snapshot.clock_secs > 0);
        let (events, final_snapshot) = drain(&mut sub).await;
        if let Some(first) = events.first() {
            assert_eq!(first.sequence, sub.snapshot.last_sequence + 1);
        }
        assert_eq!(sub.snapshot.replay(&events).players, final_snapshot.ledger.players);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_resume_are_idempotent() {
        let registry = registry();
        let (home, away) = demo_pair();
        let id = registry.create_match_with(home, away, seeded(2)).unwrap();

        assert!(!registry.pause_match(&id).await.unwrap().is_applied());
        registry.start_match(&id).await.unwrap();
        assert!(!registry.start_match(&id).await.unwrap().is_applied());

        assert!(registry.pause_match(&id).await.unwrap().is_applied());
        assert_eq!(
            registry.pause_match(&id).await.unwrap(),
            ControlOutcome::Conflict(ControlConflict::AlreadyPaused.to_string())
        );
        let frozen = registry.snapshot(&id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        let later = registry.snapshot(&id).await.unwrap();
        assert!(later.paused);
        assert_eq!(frozen.tick, later.tick);
        assert_eq!(frozen.last_sequence, later.last_sequence);

        assert!(registry.resume_match(&id).await.unwrap().is_applied());
        assert!(!registry.resume_match(&id).await.unwrap().is_applied());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(registry.snapshot(&id).await.unwrap().tick > later.tick);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminate_finishes_early_and_records() {
        let sink = Arc::new(MemoryResultSink::new());
        let registry = MatchRegistry::with_sink(
            LiveConfig { tick_interval_ms: 10, ..LiveConfig::default() },
            EngineConfig::default(),
            sink.clone(),
        );
        let (home, away) = demo_pair();
        let id = registry.create_match(home, away, true).unwrap();
        registry.start_match(&id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(registry.terminate_match(&id).await.unwrap().is_applied());
        let result = registry.result(&id).unwrap().expect("terminated match has a result");
        assert!(result.terminated_early);
        assert!(result.ledger.frozen);
        assert_eq!(sink.result_for(&id), Some(result));

        let again = registry.terminate_match(&id).await.unwrap();
        assert_eq!(again, ControlOutcome::Conflict(ControlConflict::Finished.to_string()));

        let mut sub = registry.subscribe(&id, ViewerId::from("after")).await.unwrap();
        assert_eq!(sub.snapshot.status, MatchStatus::Completed);
        assert!(sub.feed.recv().await.is_some_and(|item| item.is_final()));
        assert!(sub.feed.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_halftime_checkpoint_reaches_sink() {
        let sink = Arc::new(MemoryResultSink::new());
        let registry = MatchRegistry::with_sink(
            LiveConfig { tick_interval_ms: 1, ..LiveConfig::default() },
            EngineConfig::default(),
            sink.clone(),
        );
        let (home, away) = demo_pair();
        let id = registry.create_match_with(home, away, seeded(8)).unwrap();
        let mut sub = registry.subscribe(&id, ViewerId::from("fan")).await.unwrap();
        registry.start_match(&id).await.unwrap();
        drain(&mut sub).await;

        let checkpoint = sink.checkpoint_for(&id).expect("halftime checkpoint");
        assert_eq!(checkpoint.status, MatchStatus::Halftime);
        assert!(sink.result_for(&id).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_viewer_gets_resync_snapshot() {
        let registry = MatchRegistry::new(LiveConfig {
            tick_interval_ms: 1,
            feed_buffer: 2,
            ..LiveConfig::default()
        });
        let (home, away) = demo_pair();
        let id = registry.create_match_with(home, away, seeded(21)).unwrap();
        let mut sub = registry.subscribe(&id, ViewerId::from("slow")).await.unwrap();
        registry.start_match(&id).await.unwrap();

        let mut floor = sub.snapshot.last_sequence;
        let mut resyncs = 0;
        while let Some(item) = sub.feed.recv().await {
            match item {
                MatchFeed::Event(event) => {
                    assert!(event.sequence > floor);
                    floor = event.sequence;
                }
                MatchFeed::Snapshot(snapshot) => {
                    assert!(snapshot.last_sequence >= floor);
                    floor = snapshot.last_sequence;
                    resyncs += 1;
                }
                MatchFeed::Final(_) => break,
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(resyncs >= 1);
    }

    #[tokio::test]
    async fn test_unknown_match_and_invalid_roster() {
        let registry = registry();
        assert!(matches!(registry.snapshot("nope").await, Err(RegistryError::NotFound(_))));
        assert!(matches!(registry.start_match("nope").await, Err(RegistryError::NotFound(_))));
        assert!(matches!(registry.result("nope"), Err(RegistryError::NotFound(_))));

        let (home, mut away) = demo_pair();
        away.players.pop();
        let err = registry.create_match(home, away, true).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRoster(MatchError::InvalidTeamSize { .. })));
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test]
    async fn test_only_controllers_may_control() {
        let registry = registry();
        let (home, away) = demo_pair();
        let options = MatchOptions { controllers: vec![ViewerId::from("host")], ..MatchOptions::default() };
        let id = registry.create_match_with(home, away, options).unwrap();

        let err = registry.control_as(&id, &ViewerId::from("guest"), ControlAction::Start).await.unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
        let outcome = registry.control_as(&id, &ViewerId::from("host"), ControlAction::Start).await.unwrap();
        assert!(outcome.is_applied());
        registry.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_respect_capacity() {
        let registry = MatchRegistry::new(LiveConfig { max_active_matches: 3, ..LiveConfig::default() });
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let (home, away) = demo_pair();
                registry.create_match(home, away, true)
            }));
        }

        let mut created = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert!(matches!(err, RegistryError::CapacityExhausted { limit: 3, .. })),
            }
        }
        assert_eq!(created, 3);
        assert_eq!(registry.active_count(), 3);
        registry.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_registry_records_unfinished_matches() {
        let sink = Arc::new(MemoryResultSink::new());
        let registry = MatchRegistry::with_sink(
            LiveConfig { tick_interval_ms: 10, ..LiveConfig::default() },
            EngineConfig::default(),
            sink.clone(),
        );
        let (home, away) = demo_pair();
        let waiting = registry.create_match_with(home, away, seeded(4)).unwrap();
        let (home, away) = demo_pair();
        let paused = registry.create_match_with(home, away, seeded(6)).unwrap();
        let mut sub = registry.subscribe(&paused, ViewerId::from("fan")).await.unwrap();
        registry.start_match(&paused).await.unwrap();
        registry.pause_match(&paused).await.unwrap();

        let clone = registry.clone();
        drop(registry);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(sink.result_count(), 0, "a live clone keeps matches running");

        drop(clone);
        let mut saw_final = false;
        while let Some(item) = sub.feed.recv().await {
            saw_final |= item.is_final();
        }
        assert!(saw_final);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(sink.result_count(), 2);
        for id in [&waiting, &paused] {
            let result = sink.result_for(id).expect("abandoned match is recorded");
            assert!(result.terminated_early);
            assert!(result.ledger.frozen);
        }
    }

    #[tokio::test]
    async fn test_blocking_sink_leaves_runtime_free() {
        let (release, gate) = std::sync::mpsc::channel();
        let sink = Arc::new(GatedSink { gate: parking_lot::Mutex::new(gate), inner: MemoryResultSink::new() });
        let registry = MatchRegistry::with_sink(LiveConfig::default(), EngineConfig::default(), sink.clone());
        let (home, away) = demo_pair();
        let id = registry.create_match(home, away, true).unwrap();

        let terminating = tokio::spawn({
            let registry = registry.clone();
            let id = id.clone();
            async move { registry.terminate_match(&id).await }
        });
        // single-threaded runtime: this only wakes if the sink call is off the worker
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!terminating.is_finished());
        assert_eq!(registry.result(&id).unwrap(), None);

        release.send(()).unwrap();
        assert!(terminating.await.unwrap().unwrap().is_applied());
        assert!(sink.inner.result_for(&id).is_some_and(|r| r.terminated_early));
        assert!(registry.result(&id).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_capacity_and_shutdown() {
        let registry = MatchRegistry::new(LiveConfig { max_active_matches: 2, ..LiveConfig::default() });
        let mut ids = Vec::new();
        for _ in 0..2 {
            let (home, away) = demo_pair();
            ids.push(registry.create_match(home, away, false).unwrap());
        }
        let (home, away) = demo_pair();
        assert!(matches!(
            registry.create_match(home, away, true),
            Err(RegistryError::CapacityExhausted { active: 2, limit: 2 })
        ));

        registry.start_match(&ids[0]).await.unwrap();
        registry.shutdown().await;
        assert_eq!(registry.active_count(), 0);
        for id in &ids {
            let result = registry.result(id).unwrap().expect("shutdown records every match");
            assert_eq!(result.kind, MatchKind::League);
        }
    }
}
