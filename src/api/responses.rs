//! API response structures

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    countdown::TimeLeft,
    state::{AppState, Frame, StatusSnapshot},
};

/// API response structure for state change endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub frame: Frame,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, frame: Frame) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            frame,
        }
    }

    /// Create a success response
    pub fn ok(message: String, frame: Frame) -> Self {
        Self::new("ok".to_string(), message, frame)
    }

    /// Create an error response
    pub fn error(message: String, frame: Frame) -> Self {
        Self::new("error".to_string(), message, frame)
    }
}

/// Full countdown status for the render layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub state: AppState,
    pub time_left: TimeLeft,
    pub is_critical: bool,
    pub celebration_active: bool,
    pub network_offset_ms: i64,
    pub test_offset_ms: i64,
    pub critical_threshold_seconds: i64,
    pub target: DateTime<FixedOffset>,
    pub uptime: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusResponse {
    pub fn from_snapshot(snapshot: StatusSnapshot, uptime: String) -> Self {
        Self {
            state: snapshot.frame.state,
            time_left: snapshot.frame.time_left,
            is_critical: snapshot.frame.is_critical,
            celebration_active: snapshot.frame.celebration_active,
            network_offset_ms: snapshot.network_offset_ms,
            test_offset_ms: snapshot.test_offset_ms,
            critical_threshold_seconds: snapshot.critical_threshold_seconds,
            target: snapshot.target,
            uptime,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
