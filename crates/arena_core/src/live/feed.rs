//! Viewer feeds and non-blocking fan-out.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::models::{MatchEvent, MatchSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ViewerId(pub String);

impl ViewerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One item on a viewer's feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum MatchFeed {
    Event(MatchEvent),
    /// Resync after the viewer fell behind; replaces the events it missed
    Snapshot(MatchSnapshot),
    /// Last item on the feed
    Final(MatchSnapshot),
}

impl MatchFeed {
    /// Highest event sequence this item covers.
    pub fn sequence(&self) -> u64 {
        match self {
            MatchFeed::Event(e) => e.sequence,
            MatchFeed::Snapshot(s) | MatchFeed::Final(s) => s.last_sequence,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, MatchFeed::Final(_))
    }
}

/// What a viewer gets back from subscribing: the current state, then every
/// later change on `feed`.
#[derive(Debug)]
pub struct Subscription {
    pub snapshot: MatchSnapshot,
    pub feed: mpsc::Receiver<MatchFeed>,
}

struct Viewer {
    sender: mpsc::Sender<MatchFeed>,
    /// Sequence already covered by what this viewer received
    floor: u64,
    lagged: bool,
}

/// Per-match viewer set. Delivery never waits on a viewer.
#[derive(Default)]
pub struct Broadcaster {
    viewers: BTreeMap<ViewerId, Viewer>,
}

enum Delivery {
    Sent,
    Full,
    Closed,
}

fn offer(sender: &mpsc::Sender<MatchFeed>, item: MatchFeed) -> Delivery {
    match sender.try_send(item) {
        Ok(()) => Delivery::Sent,
        Err(TrySendError::Full(_)) => Delivery::Full,
        Err(TrySendError::Closed(_)) => Delivery::Closed,
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    pub fn contains(&self, viewer: &ViewerId) -> bool {
        self.viewers.contains_key(viewer)
    }

    /// Registers (or replaces) a viewer whose snapshot covers `floor`.
    pub fn add(&mut self, viewer: ViewerId, sender: mpsc::Sender<MatchFeed>, floor: u64) {
        self.viewers.insert(viewer, Viewer { sender, floor, lagged: false });
    }

    pub fn remove(&mut self, viewer: &ViewerId) -> bool {
        self.viewers.remove(viewer).is_some()
    }

    /// Fans out a batch of events. Lagged viewers get one fresh snapshot
    /// instead; `snapshot` is only called when someone needs it.
    pub fn broadcast(&mut self, events: &[MatchEvent], snapshot: impl Fn() -> MatchSnapshot) {
        if events.is_empty() || self.viewers.is_empty() {
            return;
        }
        let mut resync: Option<MatchSnapshot> = None;
        let mut closed = Vec::new();

        for (id, viewer) in self.viewers.iter_mut() {
            if viewer.lagged {
                let snap = resync.get_or_insert_with(&snapshot).clone();
                let floor = snap.last_sequence;
                match offer(&viewer.sender, MatchFeed::Snapshot(snap)) {
                    Delivery::Sent => {
                        debug!(viewer = %id, floor, "viewer resynced");
                        viewer.lagged = false;
                        viewer.floor = floor;
                    }
                    Delivery::Full => {}
                    Delivery::Closed => closed.push(id.clone()),
                }
                continue;
            }

            let start = viewer.floor;
            for event in events.iter().filter(|e| e.sequence > start) {
                match offer(&viewer.sender, MatchFeed::Event(event.clone())) {
                    Delivery::Sent => viewer.floor = event.sequence,
                    Delivery::Full => {
                        warn!(viewer = %id, sequence = event.sequence, "viewer feed full, dropping until resync");
                        viewer.lagged = true;
                        break;
                    }
                    Delivery::Closed => {
                        closed.push(id.clone());
                        break;
                    }
                }
            }
        }

        for id in closed {
            debug!(viewer = %id, "pruning closed viewer");
            self.viewers.remove(&id);
        }
    }

    /// Sends the final snapshot to everyone and drops all viewers. A full
    /// feed gets the final item as soon as the viewer makes room.
    pub fn finish(&mut self, snapshot: &MatchSnapshot) {
        for (id, viewer) in std::mem::take(&mut self.viewers) {
            let item = MatchFeed::Final(snapshot.clone());
            match viewer.sender.try_send(item) {
                Ok(()) => {}
                Err(TrySendError::Full(item)) => {
                    debug!(viewer = %id, "deferring final snapshot");
                    let sender = viewer.sender;
                    tokio::spawn(async move {
                        let _ = sender.send(item).await;
                    });
                }
                Err(TrySendError::Closed(_)) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EngineConfig;
    use crate::engine::match_sim::MatchEngine;
    use crate::models::fixtures::demo_pair;
    use crate::models::MatchKind;

    fn running_engine() -> MatchEngine {
        let (home, away) = demo_pair();
        let mut engine = MatchEngine::new("feed", home, away, MatchKind::Exhibition, EngineConfig::default(), Some(4)).unwrap();
        engine.start().unwrap();
        engine
    }

    fn ticks_with_events(engine: &mut MatchEngine, batches: usize) -> Vec<Vec<MatchEvent>> {
        let mut out = Vec::new();
        while out.len() < batches {
            let events = engine.tick();
            if !events.is_empty() {
                out.push(events);
            }
        }
        out
    }

    #[test]
    fn test_events_flow_in_order() {
        let mut engine = running_engine();
        let mut fan = Broadcaster::new();
        let (tx, mut rx) = mpsc::channel(64);
        fan.add(ViewerId::from("v"), tx, engine.last_sequence());

        for batch in ticks_with_events(&mut engine, 5) {
            fan.broadcast(&batch, || engine.snapshot());
        }
        let mut last = 1;
        while let Ok(item) = rx.try_recv() {
            assert!(matches!(item, MatchFeed::Event(_)));
            assert_eq!(item.sequence(), last + 1);
            last = item.sequence();
        }
        assert_eq!(last, engine.last_sequence());
    }

    #[test]
    fn test_full_feed_resyncs_with_snapshot() {
        let mut engine = running_engine();
        let mut fan = Broadcaster::new();
        let (tx, mut rx) = mpsc::channel(2);
        fan.add(ViewerId::from("slow"), tx, engine.last_sequence());

        for batch in ticks_with_events(&mut engine, 4) {
            fan.broadcast(&batch, || engine.snapshot());
        }
        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(second.sequence(), first.sequence() + 1);

        let batch = ticks_with_events(&mut engine, 1).remove(0);
        fan.broadcast(&batch, || engine.snapshot());
        match rx.try_recv().unwrap() {
            MatchFeed::Snapshot(snap) => assert_eq!(snap.last_sequence, engine.last_sequence()),
            other => panic!("expected resync snapshot, got {other:?}"),
        }

        let batch = ticks_with_events(&mut engine, 1).remove(0);
        let floor = engine.last_sequence() - batch.len() as u64;
        fan.broadcast(&batch, || engine.snapshot());
        let next = rx.try_recv().unwrap();
        assert_eq!(next.sequence(), floor + 1);
    }

    #[test]
    fn test_events_at_or_below_floor_are_skipped() {
        let mut engine = running_engine();
        let batch: Vec<MatchEvent> = ticks_with_events(&mut engine, 3).into_iter().flatten().collect();
        let mid = batch[batch.len() / 2].sequence;

        let mut fan = Broadcaster::new();
        let (tx, mut rx) = mpsc::channel(64);
        fan.add(ViewerId::from("mid"), tx, mid);
        fan.broadcast(&batch, || engine.snapshot());
        fan.broadcast(&batch, || engine.snapshot());

        let mut seen = Vec::new();
        while let Ok(item) = rx.try_recv() {
            seen.push(item.sequence());
        }
        let expected: Vec<u64> = batch.iter().map(|e| e.sequence).filter(|s| *s > mid).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_closed_viewer_is_pruned() {
        let mut engine = running_engine();
        let mut fan = Broadcaster::new();
        let (tx, rx) = mpsc::channel(8);
        fan.add(ViewerId::from("gone"), tx, engine.last_sequence());
        drop(rx);

        let batch = ticks_with_events(&mut engine, 1).remove(0);
        fan.broadcast(&batch, || engine.snapshot());
        assert!(fan.is_empty());
    }

    #[test]
    fn test_feed_item_serializes_with_kind_tag() {
        let engine = running_engine();
        let json = serde_json::to_value(MatchFeed::Event(engine.events()[0].clone())).unwrap();
        assert_eq!(json["kind"], "event");
        assert_eq!(json["data"]["type"], "kickoff");
    }
}
