//! Integration tests for snapshot restoration across engine restarts
//!
//! A "restart" is modelled by building a second engine over a store holding
//! the first engine's snapshot.

use chrono::{Duration as ChronoDuration, Utc};
use drillcall::env::storage::SESSION_SNAPSHOT_KEY;
use drillcall::{
    AnnounceOutcome, Category, DiscardReason, EngineSettings, FileStore, MemoryStore,
    PersistentStore, RestoreOutcome, SessionConfig, SessionEngine, SessionPhase, StrategyType,
    Technique,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn pool() -> Vec<Technique> {
    vec![
        Technique::new("Jab", "jab.mp3", Category::Punches),
        Technique::new("Low kick", "low_kick.mp3", Category::Kicks),
        Technique::new("Wrist release", "wrist_release.mp3", Category::HandGrip),
    ]
}

/// Copy the persisted snapshot into a fresh store, as if the process had died
async fn crash_copy(store: &MemoryStore) -> Arc<MemoryStore> {
    let raw = store
        .load(SESSION_SNAPSHOT_KEY)
        .await
        .unwrap()
        .expect("snapshot persisted");
    let copy = Arc::new(MemoryStore::new());
    copy.save(SESSION_SNAPSHOT_KEY, raw).await.unwrap();
    copy
}

#[tokio::test(start_paused = true)]
async fn test_recent_snapshot_restores_and_countdown_resumes() {
    let store = Arc::new(MemoryStore::new());
    let original = SessionEngine::builder()
        .strategy(StrategyType::PriorityBased)
        .store(store.clone())
        .build();
    let started = original
        .start(SessionConfig::new(1, 2, pool()).with_list_id("evening"))
        .await
        .unwrap();

    // periodic snapshot at 30s remaining
    tokio::time::sleep(Duration::from_millis(30_500)).await;
    let copy = crash_copy(&store).await;
    original.stop().await;

    let restarted = SessionEngine::builder().store(copy.clone()).build();
    let outcome = restarted
        .restore_at(Utc::now() + ChronoDuration::minutes(4))
        .await
        .unwrap();

    match outcome {
        RestoreOutcome::Restored {
            state,
            countdown_resumed,
        } => {
            assert!(countdown_resumed);
            assert_eq!(state.session_id, started.session_id);
            assert_eq!(state.remaining_time_seconds, 30);
            assert_eq!(state.associated_list_id.as_deref(), Some("evening"));
            assert!(state.session_stats.total_techniques >= 1);
        }
        other => panic!("expected restore, got {:?}", other),
    }
    assert_eq!(restarted.strategy_type().await, StrategyType::PriorityBased);

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    let state = restarted.state().await;
    assert_eq!(state.phase(), SessionPhase::Running);
    assert_eq!(state.remaining_time_seconds, 27);

    // no pool attached yet: nothing is announced
    let announced = state.techniques_announced_count;
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(restarted.state().await.techniques_announced_count, announced);

    // attaching the pool starts announcements after one full delay
    restarted.attach_techniques(pool()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(
        restarted.state().await.techniques_announced_count,
        announced + 1
    );

    // the restored session runs to completion
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(restarted.state().await.is_idle());
    assert!(copy.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stale_snapshot_is_discarded() {
    let store = Arc::new(MemoryStore::new());
    let original = SessionEngine::builder().store(store.clone()).build();
    original
        .start(SessionConfig::new(10, 3, pool()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let copy = crash_copy(&store).await;
    original.stop().await;

    let restarted = SessionEngine::builder().store(copy.clone()).build();
    let outcome = restarted
        .restore_at(Utc::now() + ChronoDuration::minutes(6))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        RestoreOutcome::Discarded(DiscardReason::Expired { .. })
    ));
    assert!(restarted.state().await.is_idle());
    assert!(copy.is_empty());

    // idle: nothing ticks
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(restarted.state().await.is_idle());
}

#[tokio::test]
async fn test_file_store_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let settings = EngineSettings::default().host_driven();

    let original = SessionEngine::builder()
        .settings(settings.clone())
        .store(Arc::new(FileStore::new(temp_dir.path().to_path_buf()).unwrap()))
        .build();
    original
        .start(SessionConfig::new(2, 5, pool()))
        .await
        .unwrap();
    original.announce_next().await;
    for _ in 0..30 {
        original.tick().await;
    }

    let restarted = SessionEngine::builder()
        .settings(settings)
        .store(Arc::new(FileStore::new(temp_dir.path().to_path_buf()).unwrap()))
        .build();

    let state = match restarted.restore().await.unwrap() {
        RestoreOutcome::Restored { state, .. } => state,
        other => panic!("expected restore, got {:?}", other),
    };
    assert_eq!(state.remaining_time_seconds, 90);
    assert_eq!(state.total_duration_seconds, 120);
    assert_eq!(state.techniques_announced_count, 1);

    restarted.attach_techniques(pool()).await.unwrap();
    assert!(matches!(
        restarted.announce_next().await,
        AnnounceOutcome::Announced { .. }
    ));

    let summary = restarted.stop().await.unwrap();
    assert_eq!(summary.techniques_announced_count, 2);

    let reopened = FileStore::new(temp_dir.path().to_path_buf()).unwrap();
    assert!(reopened.load(SESSION_SNAPSHOT_KEY).await.unwrap().is_none());
}
