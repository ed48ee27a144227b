//! Background tasks module
//!
//! This module contains the tasks that run alongside the HTTP server: the
//! one-shot time sync, the frame loop and the frame consumers.

pub mod celebration;
pub mod console;
pub mod frame_loop;
pub mod time_sync;

use tokio::{sync::watch, task::JoinHandle};
use tracing::warn;

// Re-export main functions
pub use celebration::spawn_celebration;
pub use console::spawn_console;
pub use frame_loop::spawn_frame_loop;
pub use time_sync::time_sync_task;

/// Stop handle for a repeating background task
#[derive(Debug)]
pub struct LoopHandle {
    name: &'static str,
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl LoopHandle {
    pub(crate) fn new(name: &'static str, stop_tx: watch::Sender<bool>, join: JoinHandle<()>) -> Self {
        Self { name, stop_tx, join }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signal the task to stop and wait for it to exit
    pub async fn stop(self) {
        // The task may already be gone
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.join.await {
            warn!("{} task ended abnormally: {}", self.name, e);
        }
    }
}

/// Stop channel for a new task
pub(crate) fn stop_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}
