//! Network time offset resolution

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::clock::Clock;

/// Reasons a reference time fetch can fail. All of them fall back to a zero offset.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("time request timed out after {0:?}")]
    Timeout(Duration),
    #[error("time request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("time source answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("time source body is unusable: {0}")]
    Body(String),
}

/// Body returned by the reference time source. Only the Unix timestamp is used.
#[derive(Debug, Deserialize)]
struct NetworkTimeResponse {
    unixtime: f64,
}

/// Reference time endpoint and its fetch bound
#[derive(Debug, Clone)]
pub struct TimeSource {
    pub url: String,
    pub timeout: Duration,
}

impl TimeSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    async fn fetch_offset(&self, clock: &dyn Clock) -> Result<i64, SyncError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(SyncError::Request)?;

        let sent_ms = clock.now_ms();
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let received_ms = clock.now_ms();

        if !response.status().is_success() {
            return Err(SyncError::Status(response.status()));
        }

        let body: NetworkTimeResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SyncError::Timeout(self.timeout)
            } else {
                SyncError::Body(e.to_string())
            }
        })?;
        debug!("Reference time source reported unixtime={}", body.unixtime);

        Ok(compute_offset(sent_ms, received_ms, body.unixtime))
    }

    fn classify(&self, error: reqwest::Error) -> SyncError {
        if error.is_timeout() {
            SyncError::Timeout(self.timeout)
        } else {
            SyncError::Request(error)
        }
    }
}

/// Offset in milliseconds between the reference clock and the local clock.
///
/// Half the round trip is credited to the response leg, so the estimated
/// server time at `received_ms` is `server_unix_seconds * 1000 + rtt / 2`.
/// A positive result means the reference clock is ahead.
pub fn compute_offset(sent_ms: i64, received_ms: i64, server_unix_seconds: f64) -> i64 {
    let server_ms = (server_unix_seconds * 1000.0).round() as i64;
    let latency = (received_ms - sent_ms) / 2;
    let estimated_server_now = server_ms + latency;
    estimated_server_now - received_ms
}

/// Fetch the reference time once and return the clock offset.
///
/// Never fails: any timeout, transport error, non-OK status or malformed
/// body is logged and yields `0`, meaning the local clock is trusted.
pub async fn resolve_offset(source: &TimeSource, clock: &dyn Clock) -> i64 {
    debug!("Fetching reference time from {}", source.url);
    match source.fetch_offset(clock).await {
        Ok(offset) => {
            info!("Time synchronized. Offset: {}ms", offset);
            offset
        }
        Err(e) => {
            warn!("Could not fetch network time, falling back to system time: {}", e);
            0
        }
    }
}
