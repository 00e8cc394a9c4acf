use crate::env::defaults;
use crate::session::errors::SessionError;
use crate::technique::{Category, Technique, TechniqueCatalog, selectable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Parameters of one session. A fresh value is required for every start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub duration_minutes: u32,
    /// Pause between the end of one announcement and the next selection
    pub delay_seconds: u32,
    /// Playback volume 0-100, forwarded to the audio player untouched
    pub volume: u8,
    pub techniques: Vec<Technique>,
    /// Named list the pool came from; opaque to the engine
    pub associated_list_id: Option<String>,
}

impl SessionConfig {
    pub fn new(duration_minutes: u32, delay_seconds: u32, techniques: Vec<Technique>) -> Self {
        Self {
            duration_minutes,
            delay_seconds,
            volume: 80,
            techniques,
            associated_list_id: None,
        }
    }

    /// Build a config over the catalog's currently selected techniques
    pub fn from_catalog(
        catalog: &dyn TechniqueCatalog,
        duration_minutes: u32,
        delay_seconds: u32,
    ) -> Self {
        Self::new(duration_minutes, delay_seconds, catalog.selected_techniques())
    }

    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_list_id(mut self, list_id: impl Into<String>) -> Self {
        self.associated_list_id = Some(list_id.into());
        self
    }

    pub fn total_seconds(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }

    pub fn selectable_techniques(&self) -> Vec<Technique> {
        selectable(&self.techniques)
    }

    pub fn has_selectable_techniques(&self) -> bool {
        self.techniques.iter().any(|t| t.selected)
    }

    /// Check the numeric bounds; pool emptiness is checked separately
    pub fn validate(&self) -> Result<(), SessionError> {
        if !(defaults::MIN_DURATION_MINUTES..=defaults::MAX_DURATION_MINUTES)
            .contains(&self.duration_minutes)
        {
            return Err(SessionError::InvalidConfig {
                field: "duration_minutes".to_string(),
                message: format!(
                    "{} is outside {}..={}",
                    self.duration_minutes,
                    defaults::MIN_DURATION_MINUTES,
                    defaults::MAX_DURATION_MINUTES
                ),
            });
        }
        if !(defaults::MIN_DELAY_SECONDS..=defaults::MAX_DELAY_SECONDS)
            .contains(&self.delay_seconds)
        {
            return Err(SessionError::InvalidConfig {
                field: "delay_seconds".to_string(),
                message: format!(
                    "{} is outside {}..={}",
                    self.delay_seconds,
                    defaults::MIN_DELAY_SECONDS,
                    defaults::MAX_DELAY_SECONDS
                ),
            });
        }
        if self.volume > defaults::MAX_VOLUME {
            return Err(SessionError::InvalidConfig {
                field: "volume".to_string(),
                message: format!("{} is above {}", self.volume, defaults::MAX_VOLUME),
            });
        }
        Ok(())
    }
}

/// Aggregate statistics of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_techniques: u32,
    #[serde(default)]
    pub by_category: BTreeMap<Category, u32>,
    /// Seconds of countdown elapsed
    pub session_duration_seconds: u32,
}

impl SessionStats {
    pub fn record(&mut self, category: Category) {
        self.total_techniques += 1;
        *self.by_category.entry(category).or_insert(0) += 1;
    }

    pub fn count_for(&self, category: Category) -> u32 {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}

/// Coarse lifecycle position derived from the state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
}

/// Authoritative in-memory record of the current session.
///
/// Invariants: `remaining_time_seconds <= total_duration_seconds`;
/// `is_paused` implies `is_active`; `current_technique` is only set between a
/// selection and the next selection or the end of the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: Option<Uuid>,
    pub is_active: bool,
    pub is_paused: bool,
    pub remaining_time_seconds: u32,
    pub total_duration_seconds: u32,
    pub current_technique: Option<Technique>,
    pub techniques_announced_count: u32,
    pub session_stats: SessionStats,
    pub associated_list_id: Option<String>,
}

impl SessionState {
    pub(crate) fn begin(config: &SessionConfig) -> Self {
        let total = config.total_seconds();
        Self {
            session_id: Some(Uuid::new_v4()),
            is_active: true,
            is_paused: false,
            remaining_time_seconds: total,
            total_duration_seconds: total,
            current_technique: None,
            techniques_announced_count: 0,
            session_stats: SessionStats::default(),
            associated_list_id: config.associated_list_id.clone(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.is_active, self.is_paused) {
            (false, _) => SessionPhase::Idle,
            (true, false) => SessionPhase::Running,
            (true, true) => SessionPhase::Paused,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase() == SessionPhase::Running
    }

    pub fn is_idle(&self) -> bool {
        !self.is_active
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_duration_seconds
            .saturating_sub(self.remaining_time_seconds)
    }

    /// 0.0 .. 100.0 progress through the session
    pub fn progress_pct(&self) -> f64 {
        if self.total_duration_seconds == 0 {
            return 0.0;
        }
        (self.elapsed_seconds() as f64 / self.total_duration_seconds as f64 * 100.0).min(100.0)
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Completed,
    Stopped,
    AudioFailure,
}

/// Final record of an ended session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Option<Uuid>,
    pub reason: EndReason,
    pub stats: SessionStats,
    pub techniques_announced_count: u32,
    pub associated_list_id: Option<String>,
}
