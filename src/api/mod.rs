//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/pause", post(pause_handler))
        .route("/reset", post(reset_handler))
        .route("/remaining/increase/:seconds", post(increase_handler))
        .route("/remaining/decrease/:seconds", post(decrease_handler))
        .route("/duration/:phase/:seconds", put(set_duration_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
