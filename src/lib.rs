//! Take Five - a Pomodoro interval timer with an HTTP control surface
//!
//! The core of this crate is [`state::TimerEngine`], a synchronous countdown
//! state machine: alternating focus and break phases, manual time
//! adjustment, a completed-session counter, and persisted phase durations.
//! Everything around it is thin plumbing: a 1 Hz tick driver task, a small
//! HTTP API standing in for buttons, and adapters for settings persistence
//! and the completion notification.

pub mod api;
pub mod config;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use services::{NotificationSink, SettingsStore};
pub use state::{AppState, Phase, TimerEngine};
pub use utils::signals::shutdown_signal;
