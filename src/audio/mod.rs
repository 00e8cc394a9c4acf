//! Audio playback collaborators.
//!
//! The engine treats playback as an opaque async capability: any `Err` or
//! `Ok(false)` counts as a failed announcement.

use crate::env::defaults;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Audio player not found: {0}")]
    PlayerNotFound(String),

    #[error("Audio file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Playback timed out after {0:?}")]
    Timeout(Duration),

    #[error("Playback failed: {0}")]
    Failed(String),
}

/// Plays technique audio by file identifier
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play the clip identified by `file_id`; `Ok(true)` on success
    async fn play(&self, file_id: &str) -> Result<bool, AudioError>;

    /// Apply a 0-100 volume level, if the player supports it
    fn set_volume(&self, _volume: u8) {}

    fn player_name(&self) -> &'static str;
}

/// Player that produces no sound and always succeeds
#[derive(Debug, Default)]
pub struct SilentAudioPlayer {
    volume: AtomicU8,
}

impl SilentAudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volume(&self) -> u8 {
        self.volume.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AudioPlayer for SilentAudioPlayer {
    async fn play(&self, file_id: &str) -> Result<bool, AudioError> {
        debug!("Silent playback of {}", file_id);
        Ok(true)
    }

    fn set_volume(&self, volume: u8) {
        self.volume.store(volume, Ordering::Relaxed);
    }

    fn player_name(&self) -> &'static str {
        "silent"
    }
}

/// Placeholder replaced by the current volume in `volume_args`
pub const VOLUME_PLACEHOLDER: &str = "{volume}";

/// Plays clips by running an external command-line player
///
/// The command line is `<program> <args...> <volume_args...> <clip>`, where
/// every `{volume}` in `volume_args` is replaced by the current 0-100 level.
#[derive(Debug)]
pub struct CommandAudioPlayer {
    program: PathBuf,
    args: Vec<String>,
    volume_args: Vec<String>,
    volume: AtomicU8,
    audio_dir: PathBuf,
    timeout: Duration,
}

impl CommandAudioPlayer {
    /// Resolve `program` on `PATH` and build a player for clips in `audio_dir`
    pub fn new(
        program: &str,
        args: Vec<String>,
        audio_dir: PathBuf,
        timeout: Duration,
    ) -> Result<Self, AudioError> {
        let program = which::which(program)
            .map_err(|e| AudioError::PlayerNotFound(format!("{}: {}", program, e)))?;

        debug!("Using audio player at {}", program.display());

        Ok(Self {
            program,
            args,
            volume_args: Vec::new(),
            volume: AtomicU8::new(defaults::MAX_VOLUME),
            audio_dir,
            timeout,
        })
    }

    /// Arguments that pass the volume to the player, e.g. `--volume={volume}`
    pub fn with_volume_args(mut self, volume_args: Vec<String>) -> Self {
        if !volume_args.is_empty() && !volume_args.iter().any(|a| a.contains(VOLUME_PLACEHOLDER))
        {
            warn!(
                "Volume arguments {:?} have no {} placeholder",
                volume_args, VOLUME_PLACEHOLDER
            );
        }
        self.volume_args = volume_args;
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    pub fn volume(&self) -> u8 {
        self.volume.load(Ordering::Relaxed)
    }

    fn clip_path(&self, file_id: &str) -> PathBuf {
        self.audio_dir.join(file_id)
    }

    fn command(&self, clip: &Path) -> Command {
        let volume = self.volume().to_string();
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .args(
                self.volume_args
                    .iter()
                    .map(|arg| arg.replace(VOLUME_PLACEHOLDER, &volume)),
            )
            .arg(clip)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl AudioPlayer for CommandAudioPlayer {
    async fn play(&self, file_id: &str) -> Result<bool, AudioError> {
        let clip = self.clip_path(file_id);
        if !clip.exists() {
            return Err(AudioError::FileNotFound(clip));
        }

        let mut command = self.command(&clip);
        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result?,
            Err(_) => return Err(AudioError::Timeout(self.timeout)),
        };

        if output.status.success() {
            Ok(true)
        } else {
            warn!(
                "Audio player exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            Ok(false)
        }
    }

    fn set_volume(&self, volume: u8) {
        self.volume.store(volume.min(defaults::MAX_VOLUME), Ordering::Relaxed);
    }

    fn player_name(&self) -> &'static str {
        "command"
    }
}
