//! State management module
//!
//! Lifecycle states, the pure countdown machine and the shared process-wide
//! state that owns it.

pub mod app_state;
pub mod countdown_state;
pub mod machine;
pub mod tick_tracker;

// Re-export main types
pub use app_state::AppState;
pub use countdown_state::{CountdownState, StateError, StatusSnapshot};
pub use machine::{CountdownMachine, Frame, MachineConfig, Tick, TransitionError};
pub use tick_tracker::TickTracker;
