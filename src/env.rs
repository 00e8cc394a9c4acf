//! Environment constants and path utilities for drillcall.
//!
//! This module centralizes the directory names, file names and storage keys used
//! throughout the application, making them easier to maintain and modify.

/// Main application directory name (hidden directory like .git, .vscode)
pub const DRILLCALL_DIR_NAME: &str = ".drillcall";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name when placed directly in the working directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "drillcall.toml";

/// Storage-related directory names and keys
pub mod storage {
    /// State directory name within .drillcall
    pub const STATE_DIR_NAME: &str = "state";

    /// Key under which the session snapshot is persisted
    pub const SESSION_SNAPSHOT_KEY: &str = "drillcall.session";

    /// Extension used by the file-backed store
    pub const STATE_FILE_EXTENSION: &str = "json";

    /// Suffix for in-flight atomic writes
    pub const TEMP_FILE_SUFFIX: &str = "tmp";
}

/// Engine defaults shared by configuration and the engine itself
pub mod defaults {
    /// Seconds of remaining time between periodic snapshots
    pub const SNAPSHOT_INTERVAL_SECONDS: u32 = 30;

    /// A snapshot older than this is discarded on restore
    pub const RESTORE_WINDOW_MINUTES: u32 = 5;

    /// Consecutive audio failures that force the session to stop
    pub const AUDIO_FAILURE_THRESHOLD: u32 = 3;

    /// Countdown tick period
    pub const TICK_INTERVAL_MS: u64 = 1000;

    pub const MIN_DURATION_MINUTES: u32 = 1;
    pub const MAX_DURATION_MINUTES: u32 = 120;
    pub const MIN_DELAY_SECONDS: u32 = 1;
    pub const MAX_DELAY_SECONDS: u32 = 60;
    pub const MAX_VOLUME: u8 = 100;
}

use std::path::{Path, PathBuf};

/// Build the main .drillcall directory path from a base directory
pub fn drillcall_dir_path(base: &Path) -> PathBuf {
    base.join(DRILLCALL_DIR_NAME)
}

/// Build the persisted-state directory path from a base directory
pub fn state_dir_path(base: &Path) -> PathBuf {
    drillcall_dir_path(base).join(storage::STATE_DIR_NAME)
}

/// Build the file path the file-backed store uses for a key
pub fn state_file_path(state_dir: &Path, key: &str) -> PathBuf {
    state_dir.join(format!("{}.{}", key, storage::STATE_FILE_EXTENSION))
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    drillcall_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build local config file path in current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    drillcall_dir_path(current_dir).join(CONFIG_FILE_NAME)
}
