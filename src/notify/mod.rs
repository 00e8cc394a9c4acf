//! Notification sinks.
//!
//! Notifications are fire-and-forget: the engine never inspects a result.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// Receives user-facing messages from the engine
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Forwards notifications to the tracing pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => info!(target: "drillcall::notify", "{}", message),
            Severity::Warning => warn!(target: "drillcall::notify", "{}", message),
            Severity::Error => error!(target: "drillcall::notify", "{}", message),
        }
    }
}

/// Prints notifications for an interactive terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => println!("🥊 {}", message),
            Severity::Warning => eprintln!("⚠️  {}", message),
            Severity::Error => eprintln!("❌ {}", message),
        }
    }
}
