//! Application lifecycle states

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of the countdown.
///
/// Progresses Loading -> ReadyToStart -> Running -> Complete. The diagnostic
/// test trigger is the only way back into Running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    /// Waiting for the reference time fetch
    Loading,
    /// Synchronized, waiting for the user to start (and enable audio)
    ReadyToStart,
    Running,
    Complete,
}

impl AppState {
    /// Whether ticks compute a countdown in this state
    pub fn is_ticking(&self) -> bool {
        matches!(self, AppState::Running | AppState::Complete)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppState::Loading => "loading",
            AppState::ReadyToStart => "ready_to_start",
            AppState::Running => "running",
            AppState::Complete => "complete",
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::Loading
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
