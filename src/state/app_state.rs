//! Shared application state

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::warn;

use super::{Phase, TimerEngine, TimerSnapshot};

/// Wraps the timer engine for shared access from the HTTP handlers and
/// the tick driver, and carries the server-level metadata reported by
/// the status endpoint.
#[derive(Debug)]
pub struct AppState {
    /// The countdown state machine; all mutations go through `with_engine`
    engine: Mutex<TimerEngine>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last control operation, for client visibility
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Tells the tick driver whether the engine wants ticks
    running_tx: watch::Sender<bool>,
    /// Keep the receiver alive to prevent channel closure
    _running_rx: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(engine: TimerEngine, port: u16, host: String) -> Self {
        let (running_tx, running_rx) = watch::channel(engine.is_running());

        Self {
            engine: Mutex::new(engine),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            running_tx,
            _running_rx: running_rx,
        }
    }

    /// Run a control operation against the engine and publish the
    /// resulting running flag to the tick driver.
    fn with_engine<F>(&self, action: &str, op: F) -> Result<TimerSnapshot, String>
    where
        F: FnOnce(&mut TimerEngine),
    {
        let mut engine = self
            .engine
            .lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        op(&mut engine);
        let snapshot = engine.snapshot();
        drop(engine);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        if let Err(e) = self.running_tx.send(snapshot.running) {
            warn!("Failed to publish running flag: {}", e);
        }

        Ok(snapshot)
    }

    pub fn start(&self) -> Result<TimerSnapshot, String> {
        self.with_engine("start", |engine| engine.start())
    }

    pub fn pause(&self) -> Result<TimerSnapshot, String> {
        self.with_engine("pause", |engine| engine.pause())
    }

    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        self.with_engine("reset", |engine| engine.reset())
    }

    pub fn increase_remaining(&self, seconds: u64) -> Result<TimerSnapshot, String> {
        self.with_engine("increase-remaining", |engine| {
            engine.increase_remaining(seconds)
        })
    }

    pub fn decrease_remaining(&self, seconds: u64) -> Result<TimerSnapshot, String> {
        self.with_engine("decrease-remaining", |engine| {
            engine.decrease_remaining(seconds)
        })
    }

    pub fn set_duration(&self, phase: Phase, seconds: i64) -> Result<TimerSnapshot, String> {
        self.with_engine("set-duration", |engine| engine.set_duration(phase, seconds))
    }

    /// Advance the countdown by one second on behalf of the tick driver.
    /// Returns whether the engine still wants ticks; a completed phase
    /// pauses the engine, and the driver detaches on the `false`.
    pub fn tick(&self) -> Result<bool, String> {
        let mut engine = self
            .engine
            .lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        engine.tick();
        let running = engine.is_running();
        drop(engine);

        if !running {
            if let Err(e) = self.running_tx.send(false) {
                warn!("Failed to publish running flag: {}", e);
            }
        }

        Ok(running)
    }

    /// Current display state, without recording an action
    pub fn snapshot(&self) -> Result<TimerSnapshot, String> {
        self.engine
            .lock()
            .map(|engine| engine.snapshot())
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Subscription handle for the tick driver
    pub fn subscribe_running(&self) -> watch::Receiver<bool> {
        self.running_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
