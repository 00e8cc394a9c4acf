//! CLI-specific functionality for drillcall
//!
//! This module contains argument parsing and the interactive control
//! commands accepted while a session runs.

pub mod args;

pub use args::{Args, Commands, ControlCommand, ExecutionMode, RestoreConfig, RunConfig};
