//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::state::{CountdownState, StateError};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

type HandlerError = (StatusCode, Json<ApiResponse>);

/// Map a shared state failure to an HTTP error with the current frame attached
fn reject(state: &CountdownState, action: &str, e: StateError) -> HandlerError {
    let status = match e {
        StateError::Transition(_) => {
            warn!("Rejected {} request: {}", action, e);
            StatusCode::CONFLICT
        }
        StateError::Poisoned(_) => {
            error!("Failed to {}: {}", action, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ApiResponse::error(e.to_string(), state.frame())))
}

/// Handle POST /start - the user gesture that starts the countdown and enables audio
pub async fn start_handler(State(state): State<Arc<CountdownState>>) -> Result<Json<ApiResponse>, HandlerError> {
    match state.start() {
        Ok(frame) => {
            info!("Start endpoint called - countdown running");
            Ok(Json(ApiResponse::ok("Countdown started".to_string(), frame)))
        }
        Err(e) => Err(reject(&state, "start", e)),
    }
}

/// Handle POST /test - diagnostic re-entry with the target a few seconds away
pub async fn test_handler(State(state): State<Arc<CountdownState>>) -> Result<Json<ApiResponse>, HandlerError> {
    match state.trigger_test() {
        Ok(frame) => {
            info!(
                "Test endpoint called - countdown restarted at {}s",
                frame.time_left.total_seconds
            );
            Ok(Json(ApiResponse::ok("Test mode engaged".to_string(), frame)))
        }
        Err(e) => Err(reject(&state, "trigger test mode", e)),
    }
}

/// Handle GET /status - Return current countdown status
pub async fn status_handler(State(state): State<Arc<CountdownState>>) -> Result<Json<StatusResponse>, StatusCode> {
    match state.snapshot() {
        Ok(snapshot) => Ok(Json(StatusResponse::from_snapshot(snapshot, state.get_uptime()))),
        Err(e) => {
            error!("Failed to get countdown status: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
