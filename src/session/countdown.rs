//! One-second countdown driver.

use crate::session::engine::EngineInner;
use crate::session::types::{EndReason, SessionSummary};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

/// Result of a single countdown tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Time was decremented; the session keeps running
    Running { remaining_seconds: u32 },
    /// The countdown reached zero and the session completed
    Completed(SessionSummary),
    /// The session was not running (or the tick belonged to an older run)
    Ignored,
}

/// Spawn the ticking task for the run identified by `epoch`
pub(crate) fn spawn(inner: Arc<EngineInner>, epoch: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = inner.settings.tick_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match inner.tick(Some(epoch)).await {
                TickOutcome::Running { .. } => {}
                TickOutcome::Completed(_) | TickOutcome::Ignored => break,
            }
        }
        debug!("Countdown for epoch {} finished", epoch);
    })
}

impl EngineInner {
    pub(crate) async fn tick(self: &Arc<Self>, epoch: Option<u64>) -> TickOutcome {
        let mut rt = self.runtime.lock().await;
        if !rt.is_current(epoch) {
            return TickOutcome::Ignored;
        }

        let remaining = rt.state.remaining_time_seconds.saturating_sub(1);
        rt.state.remaining_time_seconds = remaining;
        rt.state.session_stats.session_duration_seconds = rt.state.elapsed_seconds();

        if remaining == 0 {
            let finished = self.finish_locked(&mut rt, EndReason::Completed).await;
            drop(rt);
            return match self.report_finished(finished) {
                Some(summary) => TickOutcome::Completed(summary),
                None => TickOutcome::Ignored,
            };
        }

        let interval = self.settings.snapshot_interval_seconds;
        if interval > 0 && remaining % interval == 0 {
            self.persist_locked(&rt).await;
        }

        TickOutcome::Running {
            remaining_seconds: remaining,
        }
    }
}
