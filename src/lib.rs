//! Countdown Sync - a network-synchronized countdown service
//!
//! This library synchronizes against a reference time source once, drives a
//! frame-paced countdown to a fixed target instant and fires audio and visual
//! cues near and at zero.

pub mod api;
pub mod config;
pub mod countdown;
pub mod effects;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use countdown::{compute_time_left, resolve_offset, TimeLeft};
pub use state::{AppState, CountdownState};
pub use utils::signals::shutdown_signal;
