//! Integration tests for complete sessions driven by the engine's own timers
//!
//! All tests run on tokio's paused clock so minute-long sessions finish
//! instantly.

use drillcall::technique::Priority;
use drillcall::{
    Category, EndReason, SessionConfig, SessionEngine, SessionPhase, SessionSummary,
    StaticCatalog, StrategyType, Technique, TechniqueCatalog,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Completions = Arc<Mutex<Vec<SessionSummary>>>;

fn engine_with_completions(strategy: StrategyType) -> (SessionEngine, Completions) {
    let completions: Completions = Arc::new(Mutex::new(Vec::new()));
    let sink = completions.clone();
    let engine = SessionEngine::builder()
        .strategy(strategy)
        .on_complete(move |summary| sink.lock().unwrap().push(summary.clone()))
        .build();
    (engine, completions)
}

#[tokio::test(start_paused = true)]
async fn test_one_minute_two_technique_session() {
    let (engine, completions) = engine_with_completions(StrategyType::WeightedRandom);
    let pool = vec![
        Technique::new("A", "a.mp3", Category::Strikes),
        Technique::new("B", "b.mp3", Category::Knees),
    ];

    engine.start(SessionConfig::new(1, 1, pool)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(61)).await;

    let completions = completions.lock().unwrap();
    assert_eq!(completions.len(), 1);
    let summary = &completions[0];
    assert_eq!(summary.reason, EndReason::Completed);
    assert!(summary.stats.total_techniques >= 1);
    assert_eq!(
        summary.stats.count_for(Category::Strikes) + summary.stats.count_for(Category::Knees),
        summary.stats.total_techniques
    );
    assert_eq!(summary.stats.session_duration_seconds, 60);
}

#[tokio::test(start_paused = true)]
async fn test_paused_time_does_not_count() {
    let (engine, completions) = engine_with_completions(StrategyType::RoundRobin);
    engine
        .start(SessionConfig::new(
            1,
            5,
            vec![Technique::new("Jab", "jab.mp3", Category::Punches)],
        ))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20_500)).await;
    assert!(engine.pause().await);
    tokio::time::sleep(Duration::from_secs(100)).await;
    assert_eq!(engine.state().await.phase(), SessionPhase::Paused);
    assert_eq!(engine.state().await.remaining_time_seconds, 40);

    assert!(engine.resume().await);
    tokio::time::sleep(Duration::from_secs(39)).await;
    assert_eq!(engine.state().await.remaining_time_seconds, 1);
    assert!(completions.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(engine.state().await.is_idle());
    assert_eq!(completions.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_strategy_switch_mid_session() {
    let (engine, _completions) = engine_with_completions(StrategyType::WeightedRandom);
    let pool = vec![
        Technique::new("Jab", "jab.mp3", Category::Punches).with_priority(Priority::Low),
        Technique::new("Knife defense", "knife.mp3", Category::Knife)
            .with_priority(Priority::High),
    ];
    engine.start(SessionConfig::new(2, 2, pool)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10_500)).await;

    let before = engine.state().await;
    engine.set_strategy(StrategyType::PriorityBased).await;
    let after = engine.state().await;
    assert_eq!(before, after);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let state = engine.state().await;
    assert_eq!(
        state.current_technique.map(|t| t.name).as_deref(),
        Some("Knife defense")
    );
    assert!(
        state.session_stats.count_for(Category::Knife)
            >= 5 + before.session_stats.count_for(Category::Knife)
    );

    engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_deselecting_everything_mid_session_keeps_countdown() {
    let (engine, completions) = engine_with_completions(StrategyType::RoundRobin);
    let catalog = StaticCatalog::new(vec![
        Technique::new("Elbow", "elbow.mp3", Category::Strikes),
        Technique::new("Gun disarm", "gun.mp3", Category::Weapons).deselected(),
    ]);
    let config = SessionConfig::from_catalog(&catalog, 1, 1);
    assert_eq!(config.selectable_techniques().len(), 1);

    engine.start(config).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    let announced = engine.state().await.techniques_announced_count;
    assert!(announced >= 1);

    let none_selected: Vec<Technique> = catalog
        .techniques()
        .into_iter()
        .map(|t| t.deselected())
        .collect();
    engine.attach_techniques(none_selected).await.unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;
    let state = engine.state().await;
    assert!(state.is_running());
    assert!(state.techniques_announced_count <= announced + 1);
    assert!(state.current_technique.is_none());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(completions.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_then_start_new_session() {
    let (engine, completions) = engine_with_completions(StrategyType::RoundRobin);
    let pool = vec![Technique::new("Jab", "jab.mp3", Category::Punches)];

    let first = engine
        .start(SessionConfig::new(1, 1, pool.clone()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    let summary = engine.stop().await.unwrap();
    assert_eq!(summary.reason, EndReason::Stopped);

    let second = engine.start(SessionConfig::new(1, 1, pool)).await.unwrap();
    assert_ne!(first.session_id, second.session_id);
    assert_eq!(second.techniques_announced_count, 0);

    tokio::time::sleep(Duration::from_secs(61)).await;
    let completions = completions.lock().unwrap();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].session_id, second.session_id);
}
