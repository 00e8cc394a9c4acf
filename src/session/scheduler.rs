//! Self-rescheduling announcement loop.
//!
//! Not a fixed-interval timer: after each announcement (including its audio
//! playback) the loop sleeps for the configured delay, then continues only if
//! the run it was armed for is still going.

use crate::notify::Severity;
use crate::session::engine::{EngineInner, FirstAnnouncement};
use crate::session::types::{EndReason, SessionSummary};
use crate::technique::{Technique, selectable};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Result of a single announcement attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AnnounceOutcome {
    /// A technique was selected; `played` reports whether audio succeeded
    Announced { technique: Technique, played: bool },
    /// No selectable technique was available; nothing was announced
    Skipped,
    /// Consecutive audio failures reached the threshold and ended the session
    SessionStopped(SessionSummary),
    /// The session was not running (or the attempt belonged to an older run)
    Ignored,
}

pub(crate) fn spawn(inner: Arc<EngineInner>, epoch: u64, first: FirstAnnouncement) -> JoinHandle<()> {
    tokio::spawn(async move {
        if first == FirstAnnouncement::AfterDelay {
            let Some(delay) = inner.announcement_delay(epoch).await else {
                return;
            };
            tokio::time::sleep(delay).await;
        }

        loop {
            match inner.announce(Some(epoch)).await {
                AnnounceOutcome::Announced { .. } | AnnounceOutcome::Skipped => {}
                AnnounceOutcome::SessionStopped(_) | AnnounceOutcome::Ignored => break,
            }

            let Some(delay) = inner.announcement_delay(epoch).await else {
                break;
            };
            tokio::time::sleep(delay).await;
        }
        debug!("Announcement loop for epoch {} finished", epoch);
    })
}

impl EngineInner {
    /// Delay before the next announcement, or `None` if the run is over
    async fn announcement_delay(&self, epoch: u64) -> Option<Duration> {
        let rt = self.runtime.lock().await;
        rt.is_current(Some(epoch))
            .then(|| Duration::from_secs(rt.delay_seconds as u64))
    }

    pub(crate) async fn announce(self: &Arc<Self>, epoch: Option<u64>) -> AnnounceOutcome {
        let (technique, armed_epoch) = {
            let mut rt = self.runtime.lock().await;
            if !rt.is_current(epoch) {
                return AnnounceOutcome::Ignored;
            }

            let pool = selectable(&rt.pool);
            let technique = match rt.strategy.select(&pool) {
                Ok(technique) => technique.clone(),
                Err(e) => {
                    warn!("Skipping announcement: {}", e);
                    rt.state.current_technique = None;
                    return AnnounceOutcome::Skipped;
                }
            };

            rt.state.current_technique = Some(technique.clone());
            rt.state.techniques_announced_count += 1;
            rt.state.session_stats.record(technique.category);
            (technique, rt.epoch)
        };

        debug!(
            "Announcing {} ({}) via {}",
            technique.name,
            technique.category,
            self.audio.player_name()
        );
        self.notifier.notify(&technique.name, Severity::Info);

        let played = match self.audio.play(&technique.audio).await {
            Ok(true) => true,
            Ok(false) => {
                warn!("Audio playback reported failure for {}", technique.audio);
                false
            }
            Err(e) => {
                warn!("Audio playback failed for {}: {}", technique.audio, e);
                false
            }
        };

        let mut rt = self.runtime.lock().await;
        if rt.epoch != armed_epoch || !rt.state.is_active {
            debug!("Session moved on during playback of {}", technique.name);
            return AnnounceOutcome::Announced { technique, played };
        }

        if played {
            rt.failures.record_success();
            return AnnounceOutcome::Announced { technique, played };
        }

        let failures = rt.failures.record_failure();
        let threshold = self.settings.audio_failure_threshold;
        if !rt.failures.has_reached(threshold) {
            drop(rt);
            self.notifier.notify(
                &format!(
                    "Could not play audio for {} ({} of {} allowed failures)",
                    technique.name, failures, threshold
                ),
                Severity::Warning,
            );
            return AnnounceOutcome::Announced { technique, played };
        }

        error!(
            "{} consecutive audio failures, stopping session",
            failures
        );
        let finished = self.finish_locked(&mut rt, EndReason::AudioFailure).await;
        drop(rt);
        self.notifier.notify(
            &format!(
                "Audio failed {} times in a row; the session was stopped",
                failures
            ),
            Severity::Error,
        );
        match self.report_finished(finished) {
            Some(summary) => AnnounceOutcome::SessionStopped(summary),
            None => AnnounceOutcome::Ignored,
        }
    }
}
