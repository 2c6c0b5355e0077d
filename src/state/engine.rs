//! Countdown state machine
//!
//! `TimerEngine` owns all timer state: the current phase, the remaining
//! seconds, the running flag, the completed-session counter, and the three
//! configured durations. It is deliberately synchronous; an external driver
//! feeds it one `tick()` per simulated second and an API layer invokes the
//! control operations. Persistence and the completion cue are injected
//! collaborators, so the engine itself never performs I/O of its own.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::services::{NotificationSink, SettingsStore};
use super::Phase;

/// Smallest configurable phase duration (1 minute)
pub const MIN_DURATION_SECS: u64 = 60;
/// Largest configurable phase duration and the cap for manual
/// adjustment of the remaining time (3 hours)
pub const MAX_DURATION_SECS: u64 = 3 * 60 * 60;
/// Every Nth completed focus session earns the long break
pub const LONG_BREAK_EVERY: u64 = 4;

/// Serializable read-model of the engine, consumed by the API layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub phase_label: String,
    pub remaining_seconds: u64,
    pub time_text: String,
    pub running: bool,
    pub completed_sessions: u64,
    pub progress: f64,
    pub focus_duration: u64,
    pub short_break_duration: u64,
    pub long_break_duration: u64,
}

/// The Pomodoro countdown state machine
pub struct TimerEngine {
    phase: Phase,
    remaining_seconds: u64,
    running: bool,
    completed_sessions: u64,
    focus_duration: u64,
    short_break_duration: u64,
    long_break_duration: u64,
    settings: Box<dyn SettingsStore>,
    notifier: Box<dyn NotificationSink>,
}

impl TimerEngine {
    /// Create an engine with durations loaded from the settings store.
    /// Absent or non-positive stored values fall back to the phase's
    /// built-in default; positive values are clamped into the valid range.
    pub fn new(settings: Box<dyn SettingsStore>, notifier: Box<dyn NotificationSink>) -> Self {
        let focus_duration = load_duration(&*settings, Phase::Focus);
        let short_break_duration = load_duration(&*settings, Phase::ShortBreak);
        let long_break_duration = load_duration(&*settings, Phase::LongBreak);

        Self {
            phase: Phase::Focus,
            remaining_seconds: focus_duration,
            running: false,
            completed_sessions: 0,
            focus_duration,
            short_break_duration,
            long_break_duration,
            settings,
            notifier,
        }
    }

    /// Attach to the tick source. No-op if already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
    }

    /// Detach from the tick source. Idempotent.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Pause and restore the current phase's configured duration.
    /// Never touches the phase or the session counter.
    pub fn reset(&mut self) {
        self.pause();
        self.remaining_seconds = self.duration_of(self.phase);
    }

    /// Advance the countdown by one simulated second.
    ///
    /// Ticks are ignored while paused. A tick that observes zero remaining
    /// time completes the phase: the engine pauses itself first, fires the
    /// completion cue, then advances to the next phase. It stays paused, so
    /// each phase needs a fresh `start()`.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            return;
        }

        self.pause();
        self.notifier.play_completion();

        match self.phase {
            Phase::Focus => {
                self.completed_sessions += 1;
                if self.completed_sessions % LONG_BREAK_EVERY == 0 {
                    self.enter(Phase::LongBreak);
                } else {
                    self.enter(Phase::ShortBreak);
                }
            }
            Phase::ShortBreak | Phase::LongBreak => self.enter(Phase::Focus),
        }
    }

    /// Add to the remaining time, saturating at the 3-hour cap.
    /// Works whether or not the engine is running.
    pub fn increase_remaining(&mut self, seconds: u64) {
        self.remaining_seconds = self
            .remaining_seconds
            .saturating_add(seconds)
            .min(MAX_DURATION_SECS);
    }

    /// Subtract from the remaining time, stopping at zero. Reaching zero
    /// while running does not complete the phase immediately; the next
    /// tick observes it and performs the transition.
    pub fn decrease_remaining(&mut self, seconds: u64) {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(seconds);
    }

    /// Store a new duration for `phase`, clamped into the valid range, and
    /// persist all three durations as one explicit step. When the edited
    /// phase is the current one and the engine is paused, the countdown
    /// snaps to the new value, mirroring `reset()`.
    pub fn set_duration(&mut self, phase: Phase, seconds: i64) {
        let clamped = clamp_duration(seconds);
        match phase {
            Phase::Focus => self.focus_duration = clamped,
            Phase::ShortBreak => self.short_break_duration = clamped,
            Phase::LongBreak => self.long_break_duration = clamped,
        }
        self.persist_durations();

        if self.phase == phase && !self.running {
            self.remaining_seconds = clamped;
        }
    }

    fn enter(&mut self, phase: Phase) {
        info!(
            "{} complete ({} focus sessions done), next up: {}",
            self.phase.label(),
            self.completed_sessions,
            phase.label()
        );
        self.phase = phase;
        self.remaining_seconds = self.duration_of(phase);
    }

    fn persist_durations(&mut self) {
        self.settings
            .set(Phase::Focus.settings_key(), self.focus_duration as i64);
        self.settings.set(
            Phase::ShortBreak.settings_key(),
            self.short_break_duration as i64,
        );
        self.settings.set(
            Phase::LongBreak.settings_key(),
            self.long_break_duration as i64,
        );
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_sessions(&self) -> u64 {
        self.completed_sessions
    }

    /// Configured duration for a phase
    pub fn duration_of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus_duration,
            Phase::ShortBreak => self.short_break_duration,
            Phase::LongBreak => self.long_break_duration,
        }
    }

    /// Remaining time formatted as zero-padded "MM:SS"
    pub fn time_text(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }

    /// Human-readable name of the current phase
    pub fn phase_label(&self) -> &'static str {
        self.phase.label()
    }

    /// Fraction of the current phase still remaining, in [0, 1]
    pub fn progress_fraction(&self) -> f64 {
        let total = self.duration_of(self.phase);
        if total == 0 {
            return 0.0;
        }
        self.remaining_seconds as f64 / total as f64
    }

    /// Capture the full display state for clients
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            phase_label: self.phase.label().to_string(),
            remaining_seconds: self.remaining_seconds,
            time_text: self.time_text(),
            running: self.running,
            completed_sessions: self.completed_sessions,
            progress: self.progress_fraction(),
            focus_duration: self.focus_duration,
            short_break_duration: self.short_break_duration,
            long_break_duration: self.long_break_duration,
        }
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("phase", &self.phase)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("running", &self.running)
            .field("completed_sessions", &self.completed_sessions)
            .finish()
    }
}

fn load_duration(settings: &dyn SettingsStore, phase: Phase) -> u64 {
    match settings.get(phase.settings_key()) {
        Some(value) if value > 0 => clamp_duration(value),
        _ => phase.default_duration(),
    }
}

fn clamp_duration(seconds: i64) -> u64 {
    seconds.clamp(MIN_DURATION_SECS as i64, MAX_DURATION_SECS as i64) as u64
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::services::MemorySettingsStore;

    /// Store whose contents stay inspectable after the engine takes it
    #[derive(Clone, Default)]
    struct SharedStore {
        values: Arc<Mutex<HashMap<String, i64>>>,
    }

    impl SettingsStore for SharedStore {
        fn get(&self, key: &str) -> Option<i64> {
            self.values.lock().unwrap().get(key).copied()
        }

        fn set(&mut self, key: &str, value: i64) {
            self.values.lock().unwrap().insert(key.to_string(), value);
        }
    }

    /// Sink that counts completion cues instead of showing them
    struct CountingSink {
        completions: Arc<AtomicUsize>,
    }

    impl NotificationSink for CountingSink {
        fn play_completion(&self) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct SilentSink;

    impl NotificationSink for SilentSink {
        fn play_completion(&self) {}
    }

    fn engine() -> TimerEngine {
        TimerEngine::new(Box::new(MemorySettingsStore::new()), Box::new(SilentSink))
    }

    fn engine_with_counter() -> (TimerEngine, Arc<AtomicUsize>) {
        let completions = Arc::new(AtomicUsize::new(0));
        let sink = CountingSink {
            completions: Arc::clone(&completions),
        };
        let engine = TimerEngine::new(Box::new(MemorySettingsStore::new()), Box::new(sink));
        (engine, completions)
    }

    /// Start the engine and tick through the whole current phase,
    /// including the transition tick that observes zero.
    fn complete_phase(engine: &mut TimerEngine) {
        engine.start();
        let ticks = engine.remaining_seconds() + 1;
        for _ in 0..ticks {
            engine.tick();
        }
    }

    #[test]
    fn construction_uses_defaults_when_store_is_empty() {
        let engine = engine();
        assert_eq!(engine.phase(), Phase::Focus);
        assert_eq!(engine.remaining_seconds(), 1500);
        assert_eq!(engine.duration_of(Phase::ShortBreak), 300);
        assert_eq!(engine.duration_of(Phase::LongBreak), 900);
        assert!(!engine.is_running());
        assert_eq!(engine.completed_sessions(), 0);
    }

    #[test]
    fn construction_loads_persisted_durations() {
        let mut store = MemorySettingsStore::new();
        store.set("focusDuration", 3000);
        store.set("shortBreakDuration", 120);
        store.set("longBreakDuration", 1800);

        let engine = TimerEngine::new(Box::new(store), Box::new(SilentSink));
        assert_eq!(engine.duration_of(Phase::Focus), 3000);
        assert_eq!(engine.duration_of(Phase::ShortBreak), 120);
        assert_eq!(engine.duration_of(Phase::LongBreak), 1800);
        assert_eq!(engine.remaining_seconds(), 3000);
    }

    #[test]
    fn construction_treats_non_positive_values_as_absent() {
        let mut store = MemorySettingsStore::new();
        store.set("focusDuration", 0);
        store.set("shortBreakDuration", -45);

        let engine = TimerEngine::new(Box::new(store), Box::new(SilentSink));
        assert_eq!(engine.duration_of(Phase::Focus), 1500);
        assert_eq!(engine.duration_of(Phase::ShortBreak), 300);
    }

    #[test]
    fn construction_clamps_out_of_range_stored_values() {
        let mut store = MemorySettingsStore::new();
        store.set("focusDuration", 30);
        store.set("longBreakDuration", 999_999);

        let engine = TimerEngine::new(Box::new(store), Box::new(SilentSink));
        assert_eq!(engine.duration_of(Phase::Focus), MIN_DURATION_SECS);
        assert_eq!(engine.duration_of(Phase::LongBreak), MAX_DURATION_SECS);
    }

    #[test]
    fn tick_is_a_noop_while_paused() {
        let mut engine = engine();
        engine.tick();
        engine.tick();
        assert_eq!(engine.remaining_seconds(), 1500);
        assert_eq!(engine.phase(), Phase::Focus);
        assert!(!engine.is_running());
    }

    #[test]
    fn tick_decrements_while_running() {
        let mut engine = engine();
        engine.start();
        engine.tick();
        engine.tick();
        assert_eq!(engine.remaining_seconds(), 1498);
        assert!(engine.is_running());
    }

    #[test]
    fn start_is_idempotent() {
        let mut engine = engine();
        engine.start();
        engine.start();
        assert!(engine.is_running());
    }

    #[test]
    fn focus_completion_enters_short_break_and_pauses() {
        let (mut engine, completions) = engine_with_counter();
        engine.start();
        for _ in 0..1500 {
            engine.tick();
        }
        // Drained but not yet transitioned; the next tick observes zero.
        assert_eq!(engine.remaining_seconds(), 0);
        assert_eq!(engine.phase(), Phase::Focus);
        assert!(engine.is_running());
        assert_eq!(completions.load(Ordering::SeqCst), 0);

        engine.tick();
        assert_eq!(engine.phase(), Phase::ShortBreak);
        assert_eq!(engine.remaining_seconds(), 300);
        assert!(!engine.is_running());
        assert_eq!(engine.completed_sessions(), 1);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn break_completion_returns_to_focus_without_counting() {
        let mut engine = engine();
        complete_phase(&mut engine); // Focus -> ShortBreak
        assert_eq!(engine.completed_sessions(), 1);

        complete_phase(&mut engine); // ShortBreak -> Focus
        assert_eq!(engine.phase(), Phase::Focus);
        assert_eq!(engine.remaining_seconds(), 1500);
        assert_eq!(engine.completed_sessions(), 1);
        assert!(!engine.is_running());
    }

    #[test]
    fn every_fourth_focus_session_earns_the_long_break() {
        let (mut engine, completions) = engine_with_counter();
        let mut phases = vec![engine.phase()];

        // Walk seven phase completions: F S F S F S F -> L
        for _ in 0..7 {
            complete_phase(&mut engine);
            phases.push(engine.phase());
        }

        assert_eq!(
            phases,
            vec![
                Phase::Focus,
                Phase::ShortBreak,
                Phase::Focus,
                Phase::ShortBreak,
                Phase::Focus,
                Phase::ShortBreak,
                Phase::Focus,
                Phase::LongBreak,
            ]
        );
        assert_eq!(engine.completed_sessions(), 4);
        assert_eq!(engine.remaining_seconds(), 900);
        assert_eq!(completions.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn increase_remaining_saturates_at_the_cap() {
        let mut engine = engine();
        engine.increase_remaining(100_000);
        assert_eq!(engine.remaining_seconds(), MAX_DURATION_SECS);

        engine.increase_remaining(u64::MAX);
        assert_eq!(engine.remaining_seconds(), MAX_DURATION_SECS);
    }

    #[test]
    fn decrease_remaining_stops_at_zero() {
        let mut engine = engine();
        engine.decrease_remaining(100_000);
        assert_eq!(engine.remaining_seconds(), 0);
    }

    #[test]
    fn adjustment_leaves_phase_and_running_alone() {
        let mut engine = engine();
        engine.start();
        engine.increase_remaining(60);
        engine.decrease_remaining(120);
        assert_eq!(engine.phase(), Phase::Focus);
        assert!(engine.is_running());
    }

    #[test]
    fn decrease_to_zero_defers_completion_to_the_next_tick() {
        let (mut engine, completions) = engine_with_counter();
        engine.start();
        engine.decrease_remaining(100_000);

        // Still mid-phase until a tick observes the zero.
        assert_eq!(engine.phase(), Phase::Focus);
        assert!(engine.is_running());
        assert_eq!(completions.load(Ordering::SeqCst), 0);

        engine.tick();
        assert_eq!(engine.phase(), Phase::ShortBreak);
        assert!(!engine.is_running());
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reset_restores_duration_and_pauses() {
        let mut engine = engine();
        engine.start();
        for _ in 0..100 {
            engine.tick();
        }
        engine.reset();
        assert_eq!(engine.remaining_seconds(), 1500);
        assert!(!engine.is_running());
        assert_eq!(engine.phase(), Phase::Focus);
        assert_eq!(engine.completed_sessions(), 0);
    }

    #[test]
    fn reset_keeps_the_current_phase() {
        let mut engine = engine();
        complete_phase(&mut engine); // now ShortBreak, paused
        engine.start();
        engine.tick();
        engine.reset();
        assert_eq!(engine.phase(), Phase::ShortBreak);
        assert_eq!(engine.remaining_seconds(), 300);
        assert_eq!(engine.completed_sessions(), 1);
    }

    #[test]
    fn set_duration_clamps_into_range() {
        let mut engine = engine();
        engine.set_duration(Phase::Focus, 10);
        assert_eq!(engine.duration_of(Phase::Focus), MIN_DURATION_SECS);

        engine.set_duration(Phase::Focus, 100_000);
        assert_eq!(engine.duration_of(Phase::Focus), MAX_DURATION_SECS);

        engine.set_duration(Phase::Focus, -300);
        assert_eq!(engine.duration_of(Phase::Focus), MIN_DURATION_SECS);
    }

    #[test]
    fn set_duration_snaps_countdown_for_the_idle_current_phase() {
        let mut engine = engine();
        engine.set_duration(Phase::Focus, 45 * 60);
        assert_eq!(engine.remaining_seconds(), 2700);
    }

    #[test]
    fn set_duration_while_running_keeps_the_live_countdown() {
        let mut engine = engine();
        engine.start();
        engine.tick();
        engine.set_duration(Phase::Focus, 45 * 60);
        assert_eq!(engine.duration_of(Phase::Focus), 2700);
        assert_eq!(engine.remaining_seconds(), 1499);
    }

    #[test]
    fn set_duration_for_another_phase_keeps_the_live_countdown() {
        let mut engine = engine();
        engine.set_duration(Phase::LongBreak, 30 * 60);
        assert_eq!(engine.duration_of(Phase::LongBreak), 1800);
        assert_eq!(engine.remaining_seconds(), 1500);
    }

    #[test]
    fn set_duration_persists_all_three_durations() {
        let store = SharedStore::default();
        store.values.lock().unwrap().insert("shortBreakDuration".to_string(), 600);

        let mut engine = TimerEngine::new(Box::new(store.clone()), Box::new(SilentSink));
        engine.set_duration(Phase::Focus, 2700);

        let written = store.values.lock().unwrap().clone();
        assert_eq!(written.get("focusDuration"), Some(&2700));
        assert_eq!(written.get("shortBreakDuration"), Some(&600));
        assert_eq!(written.get("longBreakDuration"), Some(&900));

        // A fresh engine sees the persisted value.
        let reloaded = TimerEngine::new(Box::new(store), Box::new(SilentSink));
        assert_eq!(reloaded.duration_of(Phase::Focus), 2700);
    }

    #[test]
    fn time_text_zero_pads() {
        let mut engine = engine();
        engine.decrease_remaining(1500 - 125);
        assert_eq!(engine.time_text(), "02:05");

        engine.decrease_remaining(125);
        assert_eq!(engine.time_text(), "00:00");
    }

    #[test]
    fn progress_fraction_tracks_the_countdown() {
        let mut engine = engine();
        assert!((engine.progress_fraction() - 1.0).abs() < f64::EPSILON);

        engine.decrease_remaining(750);
        assert!((engine.progress_fraction() - 0.5).abs() < f64::EPSILON);

        engine.decrease_remaining(750);
        assert_eq!(engine.progress_fraction(), 0.0);
    }

    #[test]
    fn snapshot_reflects_engine_state() {
        let mut engine = engine();
        engine.start();
        engine.tick();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, Phase::Focus);
        assert_eq!(snapshot.phase_label, "Focus");
        assert_eq!(snapshot.remaining_seconds, 1499);
        assert_eq!(snapshot.time_text, "24:59");
        assert!(snapshot.running);
        assert_eq!(snapshot.completed_sessions, 0);
    }
}
