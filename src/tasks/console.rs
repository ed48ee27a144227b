//! Console renderer

use std::sync::Arc;
use chrono::Datelike;
use tokio::sync::watch;
use tracing::info;

use super::{stop_channel, LoopHandle};
use crate::state::{AppState, CountdownState, Frame};

/// Spawn a renderer that logs the countdown each time the displayed second changes
pub fn spawn_console(state: Arc<CountdownState>) -> LoopHandle {
    let (stop_tx, stop_rx) = stop_channel();
    let join = tokio::spawn(console_task(state, stop_rx));
    LoopHandle::new("console", stop_tx, join)
}

/// Line shown for a frame
pub fn render_line(frame: &Frame, target_year: i32) -> String {
    match frame.state {
        AppState::Loading => "Synchronizing time...".to_string(),
        AppState::ReadyToStart => "Ready. POST /start to begin the countdown.".to_string(),
        AppState::Running if frame.is_critical => format!("!! {} !!", frame.time_left.total_seconds),
        AppState::Running => format!("Time until {}: {}", target_year, frame.time_left),
        AppState::Complete => format!("Welcome to {}! HAPPY NEW YEAR", target_year),
    }
}

async fn console_task(state: Arc<CountdownState>, mut stop_rx: watch::Receiver<bool>) {
    let mut frames = state.subscribe();
    let target_year = state.target().year();
    let mut last_line = String::new();

    loop {
        let frame = *frames.borrow_and_update();
        let line = render_line(&frame, target_year);
        if line != last_line {
            info!("{}", line);
            last_line = line;
        }

        tokio::select! {
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = stop_rx.changed() => break,
        }
    }
}
