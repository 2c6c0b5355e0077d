//! State management module
//!
//! This module contains the countdown state machine and the shared
//! wrapper the rest of the application talks to.

pub mod app_state;
pub mod engine;
pub mod phase;

// Re-export main types
pub use app_state::AppState;
pub use engine::{TimerEngine, TimerSnapshot, MAX_DURATION_SECS, MIN_DURATION_SECS};
pub use phase::Phase;
