//! Phase-completion notification sinks
//!
//! The engine fires `play_completion` exactly once per phase completion
//! and never looks at the outcome, so implementations swallow their own
//! errors.

use notify_rust::Notification;
use tracing::{info, warn};

/// Completion cue invoked once per phase completion, fire-and-forget
pub trait NotificationSink: Send {
    fn play_completion(&self);
}

/// Posts a desktop notification that stays up until dismissed
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for DesktopNotifier {
    fn play_completion(&self) {
        let result = Notification::new()
            .summary("Take Five")
            .body("Phase complete! Time to switch.")
            .timeout(0) // No auto-dismiss
            .show();

        if let Err(e) = result {
            warn!("Failed to show completion notification: {}", e);
        }
    }
}

/// Logs the completion cue; used for headless runs
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for LogNotifier {
    fn play_completion(&self) {
        info!("Phase complete");
    }
}
