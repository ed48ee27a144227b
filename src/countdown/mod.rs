//! Countdown core
//!
//! Pure countdown arithmetic, the wall-clock abstraction and the one-shot
//! network time offset resolver.

pub mod clock;
pub mod offset;
pub mod time_left;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use offset::{compute_offset, resolve_offset, SyncError, TimeSource};
pub use time_left::{adjusted_now_ms, compute_time_left, TimeLeft};
