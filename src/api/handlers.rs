//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::state::{AppState, Phase};

use super::responses::{ApiResponse, HealthResponse, StatusResponse};

/// Handle POST /start - Attach the engine to the tick source
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.start() {
        Ok(timer) => {
            info!("Start endpoint called - {} running", timer.phase_label);
            Ok(Json(ApiResponse::for_timer(
                "Timer started".to_string(),
                timer,
            )))
        }
        Err(e) => {
            error!("Failed to start timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /pause - Detach the engine from the tick source
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.pause() {
        Ok(timer) => {
            info!("Pause endpoint called at {}", timer.time_text);
            Ok(Json(ApiResponse::for_timer(
                "Timer paused".to_string(),
                timer,
            )))
        }
        Err(e) => {
            error!("Failed to pause timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /reset - Restore the current phase's configured duration
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset() {
        Ok(timer) => {
            info!(
                "Reset endpoint called - {} back to {}",
                timer.phase_label, timer.time_text
            );
            Ok(Json(ApiResponse::for_timer(
                "Timer reset".to_string(),
                timer,
            )))
        }
        Err(e) => {
            error!("Failed to reset timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /remaining/increase/:seconds - Add to the live countdown
pub async fn increase_handler(
    State(state): State<Arc<AppState>>,
    Path(seconds): Path<u64>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.increase_remaining(seconds) {
        Ok(timer) => {
            info!(
                "Increase endpoint called - +{}s, now {}",
                seconds, timer.time_text
            );
            Ok(Json(ApiResponse::for_timer(
                format!("Remaining time increased by {}s", seconds),
                timer,
            )))
        }
        Err(e) => {
            error!("Failed to increase remaining time: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /remaining/decrease/:seconds - Take from the live countdown
pub async fn decrease_handler(
    State(state): State<Arc<AppState>>,
    Path(seconds): Path<u64>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.decrease_remaining(seconds) {
        Ok(timer) => {
            info!(
                "Decrease endpoint called - -{}s, now {}",
                seconds, timer.time_text
            );
            Ok(Json(ApiResponse::for_timer(
                format!("Remaining time decreased by {}s", seconds),
                timer,
            )))
        }
        Err(e) => {
            error!("Failed to decrease remaining time: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /duration/:phase/:seconds - Configure and persist a phase duration
pub async fn set_duration_handler(
    State(state): State<Arc<AppState>>,
    Path((phase, seconds)): Path<(String, i64)>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let phase: Phase = match phase.parse() {
        Ok(phase) => phase,
        Err(e) => {
            warn!("Rejected duration update: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    match state.set_duration(phase, seconds) {
        Ok(timer) => {
            let stored = match phase {
                Phase::Focus => timer.focus_duration,
                Phase::ShortBreak => timer.short_break_duration,
                Phase::LongBreak => timer.long_break_duration,
            };
            info!(
                "Duration endpoint called - {} set to {}s",
                phase.label(),
                stored
            );
            Ok(Json(ApiResponse::for_timer(
                format!("{} duration set to {}s", phase.label(), stored),
                timer,
            )))
        }
        Err(e) => {
            error!("Failed to set duration: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return the display state and server metadata
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.snapshot() {
        Ok(timer) => timer,
        Err(e) => {
            error!("Failed to read timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
