use crate::env::{self, storage::SESSION_SNAPSHOT_KEY};
use crate::persistence::*;
use crate::session::{SessionState, SessionStats};
use crate::strategy::StrategyType;
use crate::technique::Category;
use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;
use uuid::Uuid;

fn running_state(remaining: u32, total: u32) -> SessionState {
    let mut stats = SessionStats::default();
    stats.record(Category::Punches);
    stats.record(Category::Kicks);
    stats.session_duration_seconds = total - remaining;

    SessionState {
        session_id: Some(Uuid::new_v4()),
        is_active: true,
        is_paused: false,
        remaining_time_seconds: remaining,
        total_duration_seconds: total,
        current_technique: None,
        techniques_announced_count: 2,
        session_stats: stats,
        associated_list_id: Some("morning".to_string()),
    }
}

fn window() -> Duration {
    Duration::minutes(5)
}

#[tokio::test]
async fn test_memory_store_save_load_clear() {
    let store = MemoryStore::new();
    assert!(store.is_empty());
    assert_eq!(store.load("missing").await.unwrap(), None);

    store.save("key", "first".to_string()).await.unwrap();
    store.save("key", "second".to_string()).await.unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.load("key").await.unwrap().as_deref(), Some("second"));

    store.clear("key").await.unwrap();
    store.clear("key").await.unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_file_store_roundtrip_and_clear() {
    let temp_dir = TempDir::new().unwrap();
    let state_dir = temp_dir.path().join("nested").join("state");
    let store = FileStore::new(state_dir.clone()).unwrap();
    assert!(state_dir.is_dir());

    store
        .save(SESSION_SNAPSHOT_KEY, "{\"a\":1}".to_string())
        .await
        .unwrap();

    let file = env::state_file_path(&state_dir, SESSION_SNAPSHOT_KEY);
    assert!(file.is_file());
    let leftovers: Vec<_> = std::fs::read_dir(&state_dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext == env::storage::TEMP_FILE_SUFFIX)
        })
        .collect();
    assert!(leftovers.is_empty(), "temp file left behind");

    assert_eq!(
        store.load(SESSION_SNAPSHOT_KEY).await.unwrap().as_deref(),
        Some("{\"a\":1}")
    );

    store.clear(SESSION_SNAPSHOT_KEY).await.unwrap();
    assert!(!file.exists());
    assert_eq!(store.load(SESSION_SNAPSHOT_KEY).await.unwrap(), None);
    // clearing twice is fine
    store.clear(SESSION_SNAPSHOT_KEY).await.unwrap();
}

#[tokio::test]
async fn test_file_store_rejects_bad_keys() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path().to_path_buf()).unwrap();

    for key in ["", "../escape", ".hidden", "a/b", "with space"] {
        let result = store.save(key, "x".to_string()).await;
        assert!(
            matches!(result, Err(StoreError::InvalidKey(_))),
            "key {:?} should be rejected",
            key
        );
    }
}

#[test]
fn test_snapshot_json_layout() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 7, 30, 0).unwrap();
    let snapshot = SessionSnapshot::capture(&running_state(200, 300), 4, StrategyType::RoundRobin, now);

    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value["formatVersion"], 1);
    assert_eq!(value["remainingTimeSeconds"], 200);
    assert_eq!(value["totalDurationSeconds"], 300);
    assert_eq!(value["strategy"], "round-robin");
    assert_eq!(value["sessionStats"]["totalTechniques"], 2);
    assert_eq!(value["savedAtEpochMillis"], now.timestamp_millis());
    assert_eq!(snapshot.saved_at(), Some(now));

    let decoded: SessionSnapshot = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, snapshot);
}

#[test]
fn test_snapshot_restorable_within_window() {
    let saved = Utc.with_ymd_and_hms(2026, 3, 1, 7, 30, 0).unwrap();
    let state = running_state(120, 300);
    let snapshot = SessionSnapshot::capture(&state, 3, StrategyType::WeightedRandom, saved);

    let now = saved + Duration::minutes(4);
    assert_eq!(snapshot.age(now), Duration::minutes(4));
    assert!(snapshot.check_restorable(now, window()).is_ok());

    let restored = snapshot.to_state();
    assert_eq!(restored.session_id, state.session_id);
    assert_eq!(restored.remaining_time_seconds, 120);
    assert_eq!(restored.session_stats, state.session_stats);
    assert!(restored.current_technique.is_none());
}

#[test]
fn test_snapshot_expires_at_window_boundary() {
    let saved = Utc.with_ymd_and_hms(2026, 3, 1, 7, 30, 0).unwrap();
    let snapshot =
        SessionSnapshot::capture(&running_state(120, 300), 3, StrategyType::WeightedRandom, saved);

    let at_boundary = snapshot.check_restorable(saved + Duration::minutes(5), window());
    assert!(matches!(at_boundary, Err(DiscardReason::Expired { .. })));

    let later = snapshot.check_restorable(saved + Duration::minutes(6), window());
    assert!(matches!(later, Err(DiscardReason::Expired { .. })));
}

#[test]
fn test_snapshot_saved_in_the_future_is_rejected() {
    let saved = Utc.with_ymd_and_hms(2026, 3, 2, 7, 30, 0).unwrap();
    let snapshot =
        SessionSnapshot::capture(&running_state(120, 300), 3, StrategyType::WeightedRandom, saved);

    let now = saved - Duration::hours(24);
    assert!(snapshot.age(now) < Duration::zero());
    let reason = snapshot.check_restorable(now, window()).unwrap_err();
    assert!(matches!(reason, DiscardReason::Inconsistent(_)));
    assert_eq!(
        reason.to_string(),
        "snapshot is inconsistent: saved 86400s in the future"
    );
}

#[test]
fn test_discard_reason_messages() {
    let expired = DiscardReason::Expired {
        age: Duration::seconds(361),
    };
    assert_eq!(expired.to_string(), "snapshot is 361s old");
    assert_eq!(
        DiscardReason::Inactive.to_string(),
        "snapshot has no active session"
    );
    assert_eq!(
        DiscardReason::IncompatibleVersion(7).to_string(),
        "snapshot format version 7 is not supported"
    );
    assert_eq!(
        DiscardReason::Unreadable("eof".to_string()).to_string(),
        "snapshot is unreadable: eof"
    );
}

#[test]
fn test_snapshot_discard_reasons() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 7, 30, 0).unwrap();

    let mut inactive =
        SessionSnapshot::capture(&running_state(120, 300), 3, StrategyType::WeightedRandom, now);
    inactive.is_active = false;
    assert_eq!(
        inactive.check_restorable(now, window()),
        Err(DiscardReason::Inactive)
    );

    let mut future_version =
        SessionSnapshot::capture(&running_state(120, 300), 3, StrategyType::WeightedRandom, now);
    future_version.format_version = SNAPSHOT_FORMAT_VERSION + 1;
    assert_eq!(
        future_version.check_restorable(now, window()),
        Err(DiscardReason::IncompatibleVersion(SNAPSHOT_FORMAT_VERSION + 1))
    );

    let finished =
        SessionSnapshot::capture(&running_state(0, 300), 3, StrategyType::WeightedRandom, now);
    assert!(matches!(
        finished.check_restorable(now, window()),
        Err(DiscardReason::Inconsistent(_))
    ));

    let mut overflowing =
        SessionSnapshot::capture(&running_state(120, 300), 3, StrategyType::WeightedRandom, now);
    overflowing.remaining_time_seconds = 301;
    assert!(matches!(
        overflowing.check_restorable(now, window()),
        Err(DiscardReason::Inconsistent(_))
    ));
}

#[test]
fn test_paused_snapshot_stays_paused() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 7, 30, 0).unwrap();
    let mut state = running_state(90, 300);
    state.is_paused = true;

    let snapshot = SessionSnapshot::capture(&state, 3, StrategyType::PriorityBased, now);
    assert!(snapshot.check_restorable(now, window()).is_ok());

    let restored = snapshot.to_state();
    assert!(restored.is_active);
    assert!(restored.is_paused);
    assert!(!restored.is_running());
}
