//! Persistence hook for halftime checkpoints and final results.

use std::collections::HashMap;
use std::fs::{rename, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::PersistError;
use crate::models::{MatchResult, MatchSnapshot};

/// Receives match state worth keeping. Failures are logged by the session
/// and never stop a match.
///
/// Implementations may block: the session calls them on Tokio's blocking
/// pool and waits for each call before moving on.
pub trait ResultSink: Send + Sync {
    /// Called once at halftime.
    fn checkpoint(&self, snapshot: &MatchSnapshot) -> Result<(), PersistError>;

    /// Called once when a match completes or is terminated.
    fn record(&self, result: &MatchResult) -> Result<(), PersistError>;
}

/// Keeps everything in memory. Default sink of the registry.
#[derive(Default)]
pub struct MemoryResultSink {
    checkpoints: RwLock<HashMap<String, MatchSnapshot>>,
    results: RwLock<HashMap<String, MatchResult>>,
}

impl MemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkpoint_for(&self, match_id: &str) -> Option<MatchSnapshot> {
        self.checkpoints.read().get(match_id).cloned()
    }

    pub fn result_for(&self, match_id: &str) -> Option<MatchResult> {
        self.results.read().get(match_id).cloned()
    }

    pub fn result_count(&self) -> usize {
        self.results.read().len()
    }
}

impl ResultSink for MemoryResultSink {
    fn checkpoint(&self, snapshot: &MatchSnapshot) -> Result<(), PersistError> {
        self.checkpoints.write().insert(snapshot.match_id.clone(), snapshot.clone());
        Ok(())
    }

    fn record(&self, result: &MatchResult) -> Result<(), PersistError> {
        self.results.write().insert(result.match_id.clone(), result.clone());
        Ok(())
    }
}

/// Writes `<dir>/<match_id>.checkpoint.json` and `<dir>/<match_id>.result.json`.
pub struct JsonFileResultSink {
    dir: PathBuf,
}

impl JsonFileResultSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn checkpoint_path(&self, match_id: &str) -> PathBuf {
        self.dir.join(format!("{}.checkpoint.json", file_stem(match_id)))
    }

    pub fn result_path(&self, match_id: &str) -> PathBuf {
        self.dir.join(format!("{}.result.json", file_stem(match_id)))
    }

    pub fn load_result(&self, match_id: &str) -> Result<MatchResult, PersistError> {
        read_json(&self.result_path(match_id))
    }

    pub fn load_checkpoint(&self, match_id: &str) -> Result<MatchSnapshot, PersistError> {
        read_json(&self.checkpoint_path(match_id))
    }
}

impl ResultSink for JsonFileResultSink {
    fn checkpoint(&self, snapshot: &MatchSnapshot) -> Result<(), PersistError> {
        write_json_atomic(&self.checkpoint_path(&snapshot.match_id), snapshot)
    }

    fn record(&self, result: &MatchResult) -> Result<(), PersistError> {
        write_json_atomic(&self.result_path(&result.match_id), result)
    }
}

/// Match ids become file names; anything outside `[A-Za-z0-9_-]` is replaced.
fn file_stem(match_id: &str) -> String {
    match_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(value)?;

    // write to temp file, then rename
    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.flush()?;
        file.sync_all()?;
    }
    rename(&temp_path, path)?;

    debug!("Wrote {} bytes to {:?}", data.len(), path);
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EngineConfig;
    use crate::engine::match_sim::MatchEngine;
    use crate::models::fixtures::demo_pair;
    use crate::models::MatchKind;
    use tempfile::TempDir;

    fn finished() -> (MatchSnapshot, MatchResult) {
        let (home, away) = demo_pair();
        let mut engine = MatchEngine::new("m/1", home, away, MatchKind::Exhibition, EngineConfig::default(), Some(3)).unwrap();
        let result = engine.run_to_completion();
        (engine.snapshot(), result)
    }

    #[test]
    fn test_json_sink_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonFileResultSink::new(temp_dir.path().join("results"));
        let (snapshot, result) = finished();

        sink.checkpoint(&snapshot).unwrap();
        sink.record(&result).unwrap();

        assert_eq!(sink.load_result("m/1").unwrap(), result);
        assert_eq!(sink.load_checkpoint("m/1").unwrap().last_sequence, snapshot.last_sequence);
        assert!(sink.result_path("m/1").ends_with("m_1.result.json"));
        assert!(!sink.result_path("m/1").with_extension("tmp").exists());
    }

    #[test]
    fn test_memory_sink_keeps_latest() {
        let sink = MemoryResultSink::new();
        let (snapshot, result) = finished();
        sink.checkpoint(&snapshot).unwrap();
        sink.record(&result).unwrap();
        assert_eq!(sink.result_count(), 1);
        assert_eq!(sink.result_for("m/1").unwrap().home_score, result.home_score);
        assert!(sink.checkpoint_for("m/1").is_some());
        assert!(sink.result_for("other").is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonFileResultSink::new(temp_dir.path());
        assert!(matches!(sink.load_result("nope"), Err(PersistError::Io(_))));
    }
}
