//! Command line argument parsing
//!
//! This module handles CLI argument parsing with subcommands:
//! - `run`: Start a session over a technique catalog and control it from stdin
//! - `restore`: Restore the last session snapshot, if it is recent enough
//! - `status`: Print the persisted snapshot
//! - `clear`: Delete the persisted snapshot
//! - `show-config`: Show configuration discovery information

use crate::config::SessionDefaults;
use crate::strategy::StrategyType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug)]
pub enum ExecutionMode {
    Run(RunConfig),
    Restore(RestoreConfig),
    Status { config_override: Option<PathBuf> },
    Clear { config_override: Option<PathBuf> },
    ShowConfig { config_override: Option<PathBuf> },
}

/// Options of `drillcall run`; unset values fall back to `[session]` defaults
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub catalog: PathBuf,
    pub duration_minutes: Option<u32>,
    pub delay_seconds: Option<u32>,
    pub strategy: Option<StrategyType>,
    pub volume: Option<u8>,
    pub list_id: Option<String>,
    pub config_override: Option<PathBuf>,
    pub silent: bool,
}

impl RunConfig {
    /// Effective (duration, delay, volume, strategy) after applying defaults
    pub fn resolve(&self, defaults: &SessionDefaults) -> (u32, u32, u8, StrategyType) {
        (
            self.duration_minutes.unwrap_or(defaults.duration_minutes),
            self.delay_seconds.unwrap_or(defaults.delay_seconds),
            self.volume.unwrap_or(defaults.volume),
            self.strategy.unwrap_or(defaults.strategy),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestoreConfig {
    pub catalog: PathBuf,
    pub config_override: Option<PathBuf>,
    pub silent: bool,
}

#[derive(Debug, Parser)]
#[command(name = "drillcall")]
#[command(author = "Drillcall Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Timed training sessions that call out techniques at a steady cadence")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a session over a technique catalog
    Run {
        /// Technique catalog (TOML or JSON)
        #[arg(long = "catalog")]
        catalog: PathBuf,
        /// Session length in minutes (1-120)
        #[arg(short = 'd', long = "duration")]
        duration: Option<u32>,
        /// Seconds between announcements (1-60)
        #[arg(long = "delay")]
        delay: Option<u32>,
        /// Selection strategy: weighted-random, round-robin or priority-based
        #[arg(short = 's', long = "strategy")]
        strategy: Option<StrategyType>,
        /// Playback volume (0-100)
        #[arg(long = "volume")]
        volume: Option<u8>,
        /// Name of the technique list this session uses
        #[arg(long = "list-id")]
        list_id: Option<String>,
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        /// Do not play audio even if a player is configured
        #[arg(long = "silent")]
        silent: bool,
    },
    /// Restore the last session if its snapshot is recent enough
    Restore {
        /// Technique catalog to attach to the restored session
        #[arg(long = "catalog")]
        catalog: PathBuf,
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        /// Do not play audio even if a player is configured
        #[arg(long = "silent")]
        silent: bool,
    },
    /// Print the persisted session snapshot
    Status {
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
    },
    /// Delete the persisted session snapshot
    Clear {
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
    },
    /// Show configuration discovery information
    ShowConfig {
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
    },
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> Result<ExecutionMode, String> {
        match &self.command {
            Some(Commands::Run {
                catalog,
                duration,
                delay,
                strategy,
                volume,
                list_id,
                config,
                silent,
            }) => Ok(ExecutionMode::Run(RunConfig {
                catalog: catalog.clone(),
                duration_minutes: *duration,
                delay_seconds: *delay,
                strategy: *strategy,
                volume: *volume,
                list_id: list_id.clone(),
                config_override: config.clone(),
                silent: *silent,
            })),
            Some(Commands::Restore {
                catalog,
                config,
                silent,
            }) => Ok(ExecutionMode::Restore(RestoreConfig {
                catalog: catalog.clone(),
                config_override: config.clone(),
                silent: *silent,
            })),
            Some(Commands::Status { config }) => Ok(ExecutionMode::Status {
                config_override: config.clone(),
            }),
            Some(Commands::Clear { config }) => Ok(ExecutionMode::Clear {
                config_override: config.clone(),
            }),
            Some(Commands::ShowConfig { config }) => Ok(ExecutionMode::ShowConfig {
                config_override: config.clone(),
            }),
            None => Err(
                "No command specified. Use 'drillcall --help' to see available commands."
                    .to_string(),
            ),
        }
    }
}

/// A line typed into the interactive control loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Stop,
    Status,
    Strategy(StrategyType),
    Help,
}

impl ControlCommand {
    pub fn parse_line(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or("").to_ascii_lowercase();
        match command.as_str() {
            "pause" | "p" => Ok(ControlCommand::Pause),
            "resume" | "r" => Ok(ControlCommand::Resume),
            "stop" | "quit" | "q" => Ok(ControlCommand::Stop),
            "status" | "s" => Ok(ControlCommand::Status),
            "help" | "h" | "?" => Ok(ControlCommand::Help),
            "strategy" => {
                let kind = words
                    .next()
                    .ok_or_else(|| "usage: strategy <weighted-random|round-robin|priority-based>".to_string())?;
                kind.parse().map(ControlCommand::Strategy)
            }
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command '{}' (type 'help')", other)),
        }
    }

    pub fn help_text() -> &'static str {
        "Commands:\n  pause | p        freeze the countdown\n  resume | r       continue a paused session\n  stop | q         end the session\n  status | s       show progress\n  strategy <type>  switch selection strategy\n  help | h         show this help"
    }
}
