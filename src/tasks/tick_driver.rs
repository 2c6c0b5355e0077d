//! Tick driver background task

use std::{sync::Arc, time::Duration};

use tokio::time::interval;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Drives the countdown at 1 Hz while the engine is running.
///
/// The task parks on the engine's running flag, attaches an interval when
/// the flag goes up, and detaches when it drops again, whether that was a
/// pause, a reset, or the engine pausing itself on a completed phase.
/// Each delivered tick is exactly one simulated second; a delayed or
/// coalesced interval slows the countdown instead of skipping it.
pub async fn tick_driver_task(state: Arc<AppState>) {
    info!("Starting tick driver task");

    let mut running_rx = state.subscribe_running();

    loop {
        if !*running_rx.borrow() {
            // Parked until start() flips the flag. The sender lives in
            // AppState, so a closed channel means the server is gone.
            if running_rx.changed().await.is_err() {
                debug!("Running flag channel closed, stopping tick driver");
                return;
            }
            continue;
        }

        debug!("Engine started, attaching 1Hz tick source");
        let mut ticker = interval(Duration::from_secs(1));
        ticker.tick().await; // The first tick fires immediately; skip it.

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match state.tick() {
                        Ok(true) => {}
                        Ok(false) => {
                            debug!("Engine paused itself, detaching tick source");
                            break;
                        }
                        Err(e) => {
                            error!("Failed to tick the engine: {}", e);
                            break;
                        }
                    }
                }

                changed = running_rx.changed() => {
                    match changed {
                        Ok(()) => {
                            if !*running_rx.borrow() {
                                debug!("Engine paused, detaching tick source");
                                break;
                            }
                        }
                        Err(_) => {
                            debug!("Running flag channel closed, stopping tick driver");
                            return;
                        }
                    }
                }
            }
        }
    }
}
