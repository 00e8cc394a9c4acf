//! # Drillcall
//!
//! A timed training-session engine. A session counts down a fixed duration
//! and, at a configurable cadence, selects a technique from a pool and
//! announces it through an audio collaborator. Sessions can be paused,
//! resumed and stopped, and are snapshotted so an interrupted process can
//! pick a session back up shortly afterwards.
//!
//! ## Architecture Overview
//!
//! - **[`session`]**: The session state machine, countdown and announcement scheduler
//! - **[`strategy`]**: Weighted-random, round-robin and priority-based selection
//! - **[`persistence`]**: Snapshots and the stores they are written to
//! - **[`technique`]**: Technique model and catalogs
//! - **[`audio`]** and **[`notify`]**: Collaborators the engine reports through
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drillcall::{Category, SessionConfig, SessionEngine, Technique};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = SessionEngine::builder()
//!         .on_complete(|summary| println!("{} techniques", summary.stats.total_techniques))
//!         .build();
//!
//!     let pool = vec![
//!         Technique::new("Jab", "jab.mp3", Category::Punches),
//!         Technique::new("Front kick", "front_kick.mp3", Category::Kicks).with_weight(2.0),
//!     ];
//!     engine.start(SessionConfig::new(5, 3, pool)).await?;
//!     Ok(())
//! }
//! ```

/// Session lifecycle: start, pause, resume, stop, countdown and announcements.
///
/// The engine owns all session state behind a single lock and drives its
/// timers either from spawned tokio tasks or from the embedding host.
pub mod session;

/// Technique selection strategies.
pub mod strategy;

/// Session snapshots and key/value stores.
pub mod persistence;

/// Technique model and catalogs.
pub mod technique;

/// Audio playback collaborators.
pub mod audio;

/// User-facing notification sinks.
pub mod notify;

/// TOML configuration and discovery.
pub mod config;

/// Environment constants and path utilities.
///
/// Centralizes all hardcoded paths, file names and storage keys used
/// throughout the application for easier maintenance and consistency.
pub mod env;

// CLI module for command-line interface
pub mod cli;

pub use audio::{AudioError, AudioPlayer, CommandAudioPlayer, SilentAudioPlayer};
pub use config::{AppConfig, ConfigDiscovery, EngineSettings, TimerDrive};
pub use notify::{ConsoleNotifier, NotificationSink, Severity, TracingNotifier};
pub use persistence::{
    DiscardReason, FileStore, MemoryStore, PersistentStore, RestoreOutcome, SessionSnapshot,
    StoreError,
};
pub use session::{
    AnnounceOutcome, EndReason, SessionConfig, SessionEngine, SessionEngineBuilder, SessionError,
    SessionPhase, SessionState, SessionStats, SessionSummary, TickOutcome,
};
pub use strategy::{SelectionError, SelectionStrategy, StrategyType};
pub use technique::{Category, FileCatalog, StaticCatalog, Technique, TechniqueCatalog};
