//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Current directory: ./drillcall.toml or ./.drillcall/config.toml
//! 2. User config: ~/.drillcall/config.toml
//! 3. Built-in defaults
//!
//! Every field carries a serde default so partial files are accepted.

use crate::env::{self, defaults};
use crate::strategy::StrategyType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// How the countdown and announcement timers are driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerDrive {
    /// The engine spawns its own tokio timer tasks
    #[default]
    Spawned,
    /// The embedding application calls `tick` and `announce_next` itself
    Host,
}

/// Engine tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// A snapshot is taken whenever remaining time is a multiple of this (0 disables)
    pub snapshot_interval_seconds: u32,
    pub restore_window_minutes: u32,
    pub audio_failure_threshold: u32,
    pub tick_interval_ms: u64,
    pub drive: TimerDrive,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            snapshot_interval_seconds: defaults::SNAPSHOT_INTERVAL_SECONDS,
            restore_window_minutes: defaults::RESTORE_WINDOW_MINUTES,
            audio_failure_threshold: defaults::AUDIO_FAILURE_THRESHOLD,
            tick_interval_ms: defaults::TICK_INTERVAL_MS,
            drive: TimerDrive::default(),
        }
    }
}

impl EngineSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn restore_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.restore_window_minutes as i64)
    }

    pub fn host_driven(mut self) -> Self {
        self.drive = TimerDrive::Host;
        self
    }
}

/// Session defaults used when the command line leaves a value out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    pub duration_minutes: u32,
    pub delay_seconds: u32,
    pub volume: u8,
    pub strategy: StrategyType,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            duration_minutes: 5,
            delay_seconds: 3,
            volume: 80,
            strategy: StrategyType::default(),
        }
    }
}

/// External audio player settings; no player means silent playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub player: Option<String>,
    pub args: Vec<String>,
    /// Arguments carrying the session volume; `{volume}` is replaced by 0-100
    pub volume_args: Vec<String>,
    pub audio_dir: PathBuf,
    pub timeout_seconds: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            player: None,
            args: Vec::new(),
            volume_args: Vec::new(),
            audio_dir: PathBuf::from("sounds"),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub state_dir: Option<PathBuf>,
}

impl StorageSettings {
    /// Configured state directory, or ~/.drillcall/state
    pub fn resolve_state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            let base = ConfigDiscovery::get_home_dir()
                .or_else(|| std_env::current_dir().ok())
                .unwrap_or_else(|| PathBuf::from("."));
            env::state_dir_path(&base)
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineSettings,
    pub session: SessionDefaults,
    pub audio: AudioSettings,
    pub storage: StorageSettings,
}

impl AppConfig {
    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file {}", path.as_ref().display()))?;
        Ok(())
    }
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Load an explicit file, or discover one, or fall back to defaults
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
        if let Some(path) = explicit {
            info!("Loading configuration from: {:?}", path);
            return AppConfig::from_toml_file(path);
        }
        Self::discover_config()
    }

    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> Result<AppConfig> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return AppConfig::from_toml_file(config_path);
        }

        info!("No configuration file found, using defaults");
        Ok(AppConfig::default())
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        for candidate in Self::get_config_candidates() {
            debug!("Checking for config file: {:?}", candidate);
            if candidate.is_file() {
                debug!("Found config file: {:?}", candidate);
                return Some(candidate);
            }
        }

        debug!("No config file found in discovery hierarchy");
        None
    }

    /// Get list of configuration file candidates in priority order
    pub fn get_config_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = std_env::current_dir() {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(&current_dir));
        }

        if let Some(home_dir) = Self::get_home_dir() {
            candidates.push(env::user_config_file_path(&home_dir));
        }

        candidates
    }

    pub fn get_home_dir() -> Option<PathBuf> {
        std_env::var_os("HOME")
            .or_else(|| std_env::var_os("USERPROFILE"))
            .map(PathBuf::from)
    }

    /// Print discovery candidates and the effective configuration
    pub fn show_discovery_info(explicit: Option<&Path>) -> Result<()> {
        println!("Configuration discovery order:");
        for (i, candidate) in Self::get_config_candidates().iter().enumerate() {
            let marker = if candidate.is_file() { "found" } else { "missing" };
            println!("  {}. {} ({})", i + 1, candidate.display(), marker);
        }

        let config = Self::load(explicit)?;
        println!("\nEffective configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
        Ok(())
    }
}
