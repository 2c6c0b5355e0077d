//! External collaborator adapters
//!
//! The engine's two leaf dependencies live here: settings persistence
//! and the completion notification sink.

pub mod notify;
pub mod settings;

// Re-export main types
pub use notify::{DesktopNotifier, LogNotifier, NotificationSink};
pub use settings::{JsonSettingsStore, MemorySettingsStore, SettingsStore};
