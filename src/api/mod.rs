//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::CountdownState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<CountdownState>) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/test", post(test_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
