use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use countdown_sync::{
    countdown::{resolve_offset, SystemClock, TimeSource},
    state::{AppState, CountdownState},
    effects::TerminalAudio,
    tasks::time_sync_task,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const HOUR_MS: i64 = 3_600_000;

/// Serve a fake reference time source on an ephemeral port
async fn spawn_time_server() -> SocketAddr {
    let app = Router::new()
        .route(
            "/ahead",
            get(|| async { Json(json!({ "unixtime": Utc::now().timestamp() + 3600 })) }),
        )
        .route(
            "/error",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/garbage", get(|| async { Json(json!({ "datetime": "soon" })) }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json::<Value>(json!({ "unixtime": 0 }))
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn source(addr: SocketAddr, path: &str, timeout: Duration) -> TimeSource {
    TimeSource::new(format!("http://{}{}", addr, path), timeout)
}

#[tokio::test]
async fn offset_reflects_a_clock_running_ahead() {
    let addr = spawn_time_server().await;
    let offset = resolve_offset(&source(addr, "/ahead", Duration::from_secs(3)), &SystemClock).await;
    // Server truncates to whole seconds, so the offset can fall short by up to a second
    assert!(
        (HOUR_MS - 1_500..=HOUR_MS + 500).contains(&offset),
        "offset {offset}"
    );
}

#[tokio::test]
async fn non_ok_status_falls_back_to_zero() {
    let addr = spawn_time_server().await;
    let offset = resolve_offset(&source(addr, "/error", Duration::from_secs(3)), &SystemClock).await;
    assert_eq!(offset, 0);
}

#[tokio::test]
async fn malformed_body_falls_back_to_zero() {
    let addr = spawn_time_server().await;
    let offset = resolve_offset(&source(addr, "/garbage", Duration::from_secs(3)), &SystemClock).await;
    assert_eq!(offset, 0);
}

#[tokio::test]
async fn timeout_falls_back_to_zero() {
    let addr = spawn_time_server().await;
    let started = std::time::Instant::now();
    let offset = resolve_offset(&source(addr, "/slow", Duration::from_millis(200)), &SystemClock).await;
    assert_eq!(offset, 0);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn sync_task_moves_state_to_ready() {
    let addr = spawn_time_server().await;
    let target = chrono::DateTime::parse_from_rfc3339("2026-01-01T00:00:00+08:00").unwrap();
    let state = Arc::new(CountdownState::new(
        target,
        10,
        15,
        Arc::new(SystemClock),
        Box::new(TerminalAudio::with_writer(Vec::new(), false)),
    ));
    assert_eq!(state.app_state(), AppState::Loading);

    time_sync_task(Arc::clone(&state), source(addr, "/error", Duration::from_secs(3))).await;

    assert_eq!(state.app_state(), AppState::ReadyToStart);
    assert_eq!(state.snapshot().unwrap().network_offset_ms, 0);
}
