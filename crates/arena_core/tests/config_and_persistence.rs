use std::sync::Arc;

use arena_core::live::JsonFileResultSink;
use arena_core::models::fixtures::demo_pair;
use arena_core::{ConfigError, EngineConfig, LiveConfig, MatchFeed, MatchOptions, MatchRegistry, MatchStatus, ViewerId};
use tempfile::TempDir;

#[test]
fn test_partial_yaml_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("engine.yaml");
    std::fs::write(
        &path,
        "simulation:\n  event_probability: 0.5\nthresholds:\n  knockdown_power_threshold: 28\n",
    )
    .unwrap();

    let config = EngineConfig::from_path(&path).unwrap();
    assert!((config.simulation.event_probability - 0.5).abs() < 1e-9);
    assert!((config.thresholds.knockdown_power_threshold - 28.0).abs() < f32::EPSILON);
    assert_eq!(config.simulation.tick_seconds, 3);
    assert_eq!(config.weights, EngineConfig::default().weights);
}

#[test]
fn test_invalid_yaml_values_are_rejected() {
    let err = EngineConfig::from_yaml_str("commentary:\n  race_flavor_probability: 2.0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "commentary.race_flavor_probability", .. }));

    let missing = EngineConfig::from_path("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(missing, ConfigError::Io(_)));
}

#[tokio::test(start_paused = true)]
async fn test_live_match_writes_checkpoint_and_result_files() {
    let temp_dir = TempDir::new().unwrap();
    let sink = Arc::new(JsonFileResultSink::new(temp_dir.path()));
    let registry = MatchRegistry::with_sink(
        LiveConfig { tick_interval_ms: 1, ..LiveConfig::default() },
        EngineConfig::default(),
        sink.clone(),
    );

    let (home, away) = demo_pair();
    let id = registry
        .create_match_with(home, away, MatchOptions { seed: Some(3), ..MatchOptions::default() })
        .unwrap();
    let mut sub = registry.subscribe(&id, ViewerId::from("archive")).await.unwrap();
    registry.start_match(&id).await.unwrap();

    let mut final_snapshot = None;
    while let Some(item) = sub.feed.recv().await {
        if let MatchFeed::Final(snapshot) = item {
            final_snapshot = Some(snapshot);
            break;
        }
    }
    let final_snapshot = final_snapshot.expect("final snapshot delivered");
    assert_eq!(final_snapshot.status, MatchStatus::Completed);

    let stored = sink.load_result(&id).unwrap();
    assert_eq!((stored.home_score, stored.away_score), final_snapshot.score());
    assert_eq!(sink.load_checkpoint(&id).unwrap().status, MatchStatus::Halftime);
    assert_eq!(registry.result(&id).unwrap(), Some(stored));
}
