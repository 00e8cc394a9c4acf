//! Session state machine.
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |            |
//!           +-> Completed | Stopped | AudioFailure -> Idle
//! ```
//!
//! All state lives behind one `tokio::sync::Mutex`. Timer callbacks carry the
//! epoch they were armed in and re-check it under the lock before mutating, so
//! a tick or announcement that wakes after a pause or stop does nothing. The
//! lock is never held while audio is playing.

use crate::audio::{AudioPlayer, SilentAudioPlayer};
use crate::config::{EngineSettings, TimerDrive};
use crate::env::storage::SESSION_SNAPSHOT_KEY;
use crate::notify::{NotificationSink, Severity, TracingNotifier};
use crate::persistence::{
    DiscardReason, MemoryStore, PersistentStore, RestoreOutcome, SessionSnapshot,
};
use crate::session::errors::SessionError;
use crate::session::failure::AudioFailureCounter;
use crate::session::handle::CancellableHandle;
use crate::session::types::*;
use crate::session::countdown::{self, TickOutcome};
use crate::session::scheduler::{self, AnnounceOutcome};
use crate::strategy::{SelectionStrategy, StrategyType};
use crate::technique::Technique;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Invoked once for every session that completes naturally
pub type CompletionCallback = Arc<dyn Fn(&SessionSummary) + Send + Sync>;

/// Handle to the session engine; clones share the same session
#[derive(Clone)]
pub struct SessionEngine {
    inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    pub(crate) settings: EngineSettings,
    pub(crate) runtime: Mutex<SessionRuntime>,
    pub(crate) audio: Arc<dyn AudioPlayer>,
    pub(crate) store: Arc<dyn PersistentStore>,
    pub(crate) notifier: Arc<dyn NotificationSink>,
    on_complete: Option<CompletionCallback>,
}

/// Everything the lock protects
pub(crate) struct SessionRuntime {
    pub(crate) state: SessionState,
    /// Full pool as configured; filtered to `selected` at every announcement
    pub(crate) pool: Vec<Technique>,
    pub(crate) delay_seconds: u32,
    pub(crate) strategy: SelectionStrategy,
    pub(crate) failures: AudioFailureCounter,
    pub(crate) countdown: CancellableHandle,
    pub(crate) announcer: CancellableHandle,
    /// Bumped on every transition into or out of the running state
    pub(crate) epoch: u64,
}

impl SessionRuntime {
    fn new(strategy: StrategyType) -> Self {
        Self {
            state: SessionState::default(),
            pool: Vec::new(),
            delay_seconds: 0,
            strategy: SelectionStrategy::new(strategy),
            failures: AudioFailureCounter::new(),
            countdown: CancellableHandle::new(),
            announcer: CancellableHandle::new(),
            epoch: 0,
        }
    }

    /// Whether a callback armed in `epoch` may still act; host-driven calls pass `None`
    pub(crate) fn is_current(&self, epoch: Option<u64>) -> bool {
        self.state.is_running() && epoch.is_none_or(|e| e == self.epoch)
    }

    fn take_timers(&mut self) -> TimerSet {
        TimerSet {
            _countdown: std::mem::take(&mut self.countdown),
            _announcer: std::mem::take(&mut self.announcer),
        }
    }

    fn capture(&self) -> SessionSnapshot {
        SessionSnapshot::capture(
            &self.state,
            self.delay_seconds,
            self.strategy.kind(),
            Utc::now(),
        )
    }
}

/// Timers detached from the runtime; cancelled when dropped
struct TimerSet {
    _countdown: CancellableHandle,
    _announcer: CancellableHandle,
}

/// A session that just ended, plus the timers to cancel once reported
pub(crate) struct Finished {
    summary: Option<SessionSummary>,
    _timers: TimerSet,
}

/// When the first announcement of a freshly armed scheduler happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FirstAnnouncement {
    Immediate,
    AfterDelay,
}

impl EngineInner {
    fn arm_countdown(self: &Arc<Self>, rt: &mut SessionRuntime) {
        if self.settings.drive == TimerDrive::Spawned {
            rt.countdown.arm(countdown::spawn(self.clone(), rt.epoch));
        }
    }

    pub(crate) fn arm_announcer(self: &Arc<Self>, rt: &mut SessionRuntime, first: FirstAnnouncement) {
        if self.settings.drive == TimerDrive::Spawned {
            rt.announcer
                .arm(scheduler::spawn(self.clone(), rt.epoch, first));
        }
    }

    /// Write a snapshot of `rt`; failures are logged and swallowed
    pub(crate) async fn persist_locked(&self, rt: &SessionRuntime) {
        let snapshot = rt.capture();
        let encoded = match serde_json::to_string(&snapshot) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode session snapshot: {}", e);
                return;
            }
        };
        match self.store.save(SESSION_SNAPSHOT_KEY, encoded).await {
            Ok(()) => debug!(
                "Session snapshot saved ({}s remaining)",
                snapshot.remaining_time_seconds
            ),
            Err(e) => warn!("Failed to save session snapshot: {}", e),
        }
    }

    /// Return to idle, producing a summary if a session was active
    pub(crate) async fn finish_locked(&self, rt: &mut SessionRuntime, reason: EndReason) -> Finished {
        let timers = rt.take_timers();
        rt.epoch += 1;
        rt.failures.reset();

        let summary = rt.state.is_active.then(|| {
            let mut stats = rt.state.session_stats.clone();
            stats.session_duration_seconds = rt.state.elapsed_seconds();
            SessionSummary {
                session_id: rt.state.session_id,
                reason,
                stats,
                techniques_announced_count: rt.state.techniques_announced_count,
                associated_list_id: rt.state.associated_list_id.clone(),
            }
        });

        rt.state = SessionState::default();
        rt.pool.clear();

        if let Err(e) = self.store.clear(SESSION_SNAPSHOT_KEY).await {
            warn!("Failed to clear session snapshot: {}", e);
        }

        Finished {
            summary,
            _timers: timers,
        }
    }

    /// Report an ended session; runs outside the lock
    pub(crate) fn report_finished(&self, finished: Finished) -> Option<SessionSummary> {
        let Finished { summary, _timers } = finished;
        let summary = summary?;

        info!(
            "Session {:?} ended ({:?}): {} techniques in {}s",
            summary.session_id,
            summary.reason,
            summary.stats.total_techniques,
            summary.stats.session_duration_seconds
        );

        if summary.reason == EndReason::Completed {
            self.notifier.notify(
                &format!(
                    "Session complete: {} techniques announced",
                    summary.stats.total_techniques
                ),
                Severity::Info,
            );
            if let Some(callback) = &self.on_complete {
                callback(&summary);
            }
        }

        Some(summary)
    }
}

impl SessionEngine {
    pub fn builder() -> SessionEngineBuilder {
        SessionEngineBuilder::default()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.inner.settings
    }

    /// Copy of the current session state
    pub async fn state(&self) -> SessionState {
        self.inner.runtime.lock().await.state.clone()
    }

    pub async fn audio_failure_count(&self) -> u32 {
        self.inner.runtime.lock().await.failures.count()
    }

    pub async fn strategy_type(&self) -> StrategyType {
        self.inner.runtime.lock().await.strategy.kind()
    }

    /// Swap the selection strategy; session state is untouched
    pub async fn set_strategy(&self, kind: StrategyType) -> StrategyType {
        let mut rt = self.inner.runtime.lock().await;
        let previous = rt.strategy.kind();
        if previous != kind {
            rt.strategy = SelectionStrategy::new(kind);
            info!("Selection strategy changed from {} to {}", previous, kind);
        }
        previous
    }

    /// Whether `start(config)` would currently succeed
    pub async fn is_ready_to_start(&self, config: &SessionConfig) -> bool {
        let idle = self.inner.runtime.lock().await.state.is_idle();
        idle && config.validate().is_ok() && config.has_selectable_techniques()
    }

    pub async fn start(&self, config: SessionConfig) -> Result<SessionState, SessionError> {
        let mut rt = self.inner.runtime.lock().await;
        if rt.state.is_active {
            return Err(SessionError::AlreadyActive);
        }
        config.validate()?;
        if !config.has_selectable_techniques() {
            return Err(SessionError::NoSelectableTechniques);
        }

        rt.state = SessionState::begin(&config);
        rt.pool = config.techniques;
        rt.delay_seconds = config.delay_seconds;
        rt.failures.reset();
        rt.epoch += 1;

        self.inner.audio.set_volume(config.volume);
        self.inner.persist_locked(&rt).await;
        self.inner.arm_countdown(&mut rt);
        self.inner.arm_announcer(&mut rt, FirstAnnouncement::Immediate);

        info!(
            "Session {:?} started: {}s, {}s between techniques, {} techniques, {} strategy",
            rt.state.session_id,
            rt.state.total_duration_seconds,
            rt.delay_seconds,
            rt.pool.iter().filter(|t| t.selected).count(),
            rt.strategy.kind()
        );

        Ok(rt.state.clone())
    }

    /// Freeze the countdown and the scheduler. No-op unless running.
    pub async fn pause(&self) -> bool {
        let timers = {
            let mut rt = self.inner.runtime.lock().await;
            if !rt.state.is_running() {
                debug!("Pause ignored: session is not running");
                return false;
            }
            rt.state.is_paused = true;
            rt.epoch += 1;
            let timers = rt.take_timers();
            self.inner.persist_locked(&rt).await;
            info!(
                "Session paused with {}s remaining",
                rt.state.remaining_time_seconds
            );
            timers
        };
        drop(timers);
        true
    }

    /// Restart the countdown from the frozen remaining time. No-op unless paused.
    ///
    /// The scheduler is re-armed but waits a full delay before its next
    /// announcement; resuming never announces immediately.
    pub async fn resume(&self) -> bool {
        let mut rt = self.inner.runtime.lock().await;
        if !(rt.state.is_active && rt.state.is_paused) {
            debug!("Resume ignored: session is not paused");
            return false;
        }
        rt.state.is_paused = false;
        rt.epoch += 1;

        if !rt.pool.iter().any(|t| t.selected) {
            warn!("Resuming without selectable techniques; announcements will be skipped");
        }

        self.inner.persist_locked(&rt).await;
        self.inner.arm_countdown(&mut rt);
        self.inner.arm_announcer(&mut rt, FirstAnnouncement::AfterDelay);
        info!(
            "Session resumed with {}s remaining",
            rt.state.remaining_time_seconds
        );
        true
    }

    /// Cancel all timers, clear the snapshot and return to idle. Always legal.
    pub async fn stop(&self) -> Option<SessionSummary> {
        let finished = {
            let mut rt = self.inner.runtime.lock().await;
            self.inner.finish_locked(&mut rt, EndReason::Stopped).await
        };
        self.inner.report_finished(finished)
    }

    /// Replace the technique pool of the active session.
    ///
    /// Used after a restore (snapshots carry no techniques) and when the
    /// selection changes mid-session. Arms the scheduler, after a full delay,
    /// if the session is running and none is pending.
    pub async fn attach_techniques(&self, techniques: Vec<Technique>) -> Result<(), SessionError> {
        let mut rt = self.inner.runtime.lock().await;
        if !rt.state.is_active {
            return Err(SessionError::NotActive);
        }
        rt.pool = techniques;
        debug!(
            "Attached {} techniques ({} selectable)",
            rt.pool.len(),
            rt.pool.iter().filter(|t| t.selected).count()
        );
        if rt.state.is_running() && !rt.announcer.is_armed() {
            self.inner
                .arm_announcer(&mut rt, FirstAnnouncement::AfterDelay);
        }
        Ok(())
    }

    /// Persist the current state now; returns the snapshot written
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let rt = self.inner.runtime.lock().await;
        if !rt.state.is_active {
            return None;
        }
        self.inner.persist_locked(&rt).await;
        Some(rt.capture())
    }

    /// Perform one countdown tick (host-driven mode)
    pub async fn tick(&self) -> TickOutcome {
        self.inner.tick(None).await
    }

    /// Perform one announcement attempt (host-driven mode)
    pub async fn announce_next(&self) -> AnnounceOutcome {
        self.inner.announce(None).await
    }

    pub async fn restore(&self) -> Result<RestoreOutcome, SessionError> {
        self.restore_at(Utc::now()).await
    }

    /// Restore the last snapshot if it is recent enough relative to `now`.
    ///
    /// A restored running session resumes its countdown; the scheduler starts
    /// once the caller attaches a technique pool. A paused one stays paused.
    pub async fn restore_at(&self, now: DateTime<Utc>) -> Result<RestoreOutcome, SessionError> {
        let mut rt = self.inner.runtime.lock().await;
        if rt.state.is_active {
            return Err(SessionError::AlreadyActive);
        }

        let raw = match self.inner.store.load(SESSION_SNAPSHOT_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No session snapshot to restore");
                return Ok(RestoreOutcome::Absent);
            }
            Err(e) => {
                warn!("Failed to load session snapshot: {}", e);
                return Ok(RestoreOutcome::Discarded(DiscardReason::Unreadable(
                    e.to_string(),
                )));
            }
        };

        let verdict = serde_json::from_str::<SessionSnapshot>(&raw)
            .map_err(|e| DiscardReason::Unreadable(e.to_string()))
            .and_then(|snapshot| {
                snapshot
                    .check_restorable(now, self.inner.settings.restore_window())
                    .map(|()| snapshot)
            });

        let snapshot = match verdict {
            Ok(snapshot) => snapshot,
            Err(reason) => {
                info!("Discarding session snapshot: {}", reason);
                if let Err(e) = self.inner.store.clear(SESSION_SNAPSHOT_KEY).await {
                    warn!("Failed to clear session snapshot: {}", e);
                }
                return Ok(RestoreOutcome::Discarded(reason));
            }
        };

        rt.state = snapshot.to_state();
        rt.pool.clear();
        rt.delay_seconds = snapshot.delay_seconds;
        rt.strategy = SelectionStrategy::new(snapshot.strategy);
        rt.failures.reset();
        rt.epoch += 1;

        let countdown_resumed = rt.state.is_running();
        if countdown_resumed {
            self.inner.arm_countdown(&mut rt);
        }
        self.inner.persist_locked(&rt).await;

        info!(
            "Restored session {:?} with {}s remaining ({})",
            rt.state.session_id,
            rt.state.remaining_time_seconds,
            if countdown_resumed { "running" } else { "paused" }
        );

        Ok(RestoreOutcome::Restored {
            state: rt.state.clone(),
            countdown_resumed,
        })
    }
}

/// Builder for [`SessionEngine`]; unset collaborators get silent/in-memory defaults
#[derive(Default)]
pub struct SessionEngineBuilder {
    settings: EngineSettings,
    strategy: StrategyType,
    audio: Option<Arc<dyn AudioPlayer>>,
    store: Option<Arc<dyn PersistentStore>>,
    notifier: Option<Arc<dyn NotificationSink>>,
    on_complete: Option<CompletionCallback>,
}

impl SessionEngineBuilder {
    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn strategy(mut self, strategy: StrategyType) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn audio(mut self, audio: Arc<dyn AudioPlayer>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SessionSummary) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> SessionEngine {
        let inner = EngineInner {
            runtime: Mutex::new(SessionRuntime::new(self.strategy)),
            settings: self.settings,
            audio: self
                .audio
                .unwrap_or_else(|| Arc::new(SilentAudioPlayer::new())),
            store: self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            on_complete: self.on_complete,
        };
        SessionEngine {
            inner: Arc::new(inner),
        }
    }
}
