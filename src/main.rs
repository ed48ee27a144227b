//! Countdown Sync - a network-synchronized countdown service
//!
//! This is the main entry point for the countdown-sync application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_sync::{
    api::create_router,
    config::Config,
    countdown::SystemClock,
    effects::{FireworksShow, LogEffects, TerminalAudio},
    state::CountdownState,
    tasks::{spawn_celebration, spawn_console, spawn_frame_loop, time_sync_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_sync={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-sync v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: target={}, threshold={}s, frame={}ms",
        config.target, config.critical_threshold, config.frame_ms
    );

    // Create shared countdown state
    let state = Arc::new(CountdownState::new(
        config.target,
        config.critical_threshold,
        config.test_lead_seconds,
        Arc::new(SystemClock),
        Box::new(TerminalAudio::new(config.bell)),
    ));

    // Consumers subscribe before anything can change
    let celebration = spawn_celebration(
        Arc::clone(&state),
        FireworksShow::default(),
        Box::new(LogEffects::new()),
    );
    let console = config.console.then(|| spawn_console(Arc::clone(&state)));

    // Synchronize once, then leave Loading
    tokio::spawn(time_sync_task(Arc::clone(&state), config.time_source()));

    let frame_loop = spawn_frame_loop(Arc::clone(&state), config.frame_period());

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start  - Start the countdown and enable audio");
    info!("  POST /test   - Restart {}s before the target", config.test_lead_seconds);
    info!("  GET  /status - Current countdown status");
    info!("  GET  /health - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    frame_loop.stop().await;
    celebration.stop().await;
    if let Some(console) = console {
        console.stop().await;
    }

    info!("Server shutdown complete");
    Ok(())
}
