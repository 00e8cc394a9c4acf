use crate::session::{SessionState, SessionStats};
use crate::strategy::StrategyType;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot layout version; snapshots with another version are discarded
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Serialized copy of the session state used for restoration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub format_version: u32,
    pub session_id: Option<Uuid>,
    pub is_active: bool,
    pub is_paused: bool,
    pub remaining_time_seconds: u32,
    pub total_duration_seconds: u32,
    pub techniques_announced_count: u32,
    pub session_stats: SessionStats,
    pub associated_list_id: Option<String>,
    pub delay_seconds: u32,
    pub strategy: StrategyType,
    pub saved_at_epoch_millis: i64,
}

impl SessionSnapshot {
    pub fn capture(
        state: &SessionState,
        delay_seconds: u32,
        strategy: StrategyType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            session_id: state.session_id,
            is_active: state.is_active,
            is_paused: state.is_paused,
            remaining_time_seconds: state.remaining_time_seconds,
            total_duration_seconds: state.total_duration_seconds,
            techniques_announced_count: state.techniques_announced_count,
            session_stats: state.session_stats.clone(),
            associated_list_id: state.associated_list_id.clone(),
            delay_seconds,
            strategy,
            saved_at_epoch_millis: now.timestamp_millis(),
        }
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.saved_at_epoch_millis)
    }

    /// Age of the snapshot relative to `now`; negative if saved in the future
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        Duration::milliseconds(now.timestamp_millis() - self.saved_at_epoch_millis)
    }

    /// Decide whether this snapshot may be restored at `now`
    pub fn check_restorable(
        &self,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<(), DiscardReason> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(DiscardReason::IncompatibleVersion(self.format_version));
        }
        if !self.is_active {
            return Err(DiscardReason::Inactive);
        }
        let age = self.age(now);
        if age < Duration::zero() {
            return Err(DiscardReason::Inconsistent(format!(
                "saved {}s in the future",
                -age.num_seconds()
            )));
        }
        if age >= window {
            return Err(DiscardReason::Expired { age });
        }
        if self.remaining_time_seconds == 0
            || self.remaining_time_seconds > self.total_duration_seconds
        {
            return Err(DiscardReason::Inconsistent(format!(
                "remaining {}s of {}s",
                self.remaining_time_seconds, self.total_duration_seconds
            )));
        }
        Ok(())
    }

    /// Rebuild the in-memory state this snapshot describes
    pub fn to_state(&self) -> SessionState {
        SessionState {
            session_id: self.session_id,
            is_active: self.is_active,
            is_paused: self.is_paused,
            remaining_time_seconds: self.remaining_time_seconds,
            total_duration_seconds: self.total_duration_seconds,
            current_technique: None,
            techniques_announced_count: self.techniques_announced_count,
            session_stats: self.session_stats.clone(),
            associated_list_id: self.associated_list_id.clone(),
        }
    }
}

/// Why a stored snapshot was not restored
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiscardReason {
    #[error("snapshot is {}s old", .age.num_seconds())]
    Expired { age: Duration },

    #[error("snapshot has no active session")]
    Inactive,

    #[error("snapshot format version {0} is not supported")]
    IncompatibleVersion(u32),

    #[error("snapshot is inconsistent: {0}")]
    Inconsistent(String),

    #[error("snapshot is unreadable: {0}")]
    Unreadable(String),
}

/// Result of attempting to restore a session on startup
#[derive(Debug, Clone)]
pub enum RestoreOutcome {
    /// The snapshot was restored; the countdown resumed unless it was paused
    Restored {
        state: SessionState,
        countdown_resumed: bool,
    },
    /// A snapshot existed but was dropped
    Discarded(DiscardReason),
    /// Nothing was stored
    Absent,
}

impl RestoreOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreOutcome::Restored { .. })
    }
}
