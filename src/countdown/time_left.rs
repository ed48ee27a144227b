//! Time-left calculation

use std::fmt;

use serde::{Deserialize, Serialize};

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Remaining time until the target instant, broken into display units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub total_seconds: i64,
    pub is_complete: bool,
}

impl TimeLeft {
    /// The terminal value: everything zero, complete
    pub fn complete() -> Self {
        Self {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            total_seconds: 0,
            is_complete: true,
        }
    }

    /// Placeholder shown before the first tick
    pub fn pending() -> Self {
        Self {
            is_complete: false,
            ..Self::complete()
        }
    }

    /// Whether the countdown sits inside the critical window `(0, threshold]`
    pub fn is_critical(&self, threshold_seconds: i64) -> bool {
        self.total_seconds > 0 && self.total_seconds <= threshold_seconds
    }
}

impl Default for TimeLeft {
    fn default() -> Self {
        Self::pending()
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Local clock reading shifted by the network offset and the diagnostic test offset
pub fn adjusted_now_ms(local_now_ms: i64, network_offset_ms: i64, test_offset_ms: i64) -> i64 {
    local_now_ms
        .saturating_add(network_offset_ms)
        .saturating_add(test_offset_ms)
}

/// Compute the time left between `adjusted_now_ms` and `target_ms`.
///
/// Both arguments are milliseconds since the Unix epoch. Any non-positive
/// difference yields [`TimeLeft::complete`].
pub fn compute_time_left(target_ms: i64, adjusted_now_ms: i64) -> TimeLeft {
    let difference = target_ms.saturating_sub(adjusted_now_ms);
    if difference <= 0 {
        return TimeLeft::complete();
    }

    // difference > 0 here, so every quotient is non-negative. The final
    // sub-second reads as total_seconds == 0 while still running.
    TimeLeft {
        days: (difference / MS_PER_DAY) as u64,
        hours: ((difference / MS_PER_HOUR) % 24) as u64,
        minutes: ((difference / MS_PER_MINUTE) % 60) as u64,
        seconds: ((difference / MS_PER_SECOND) % 60) as u64,
        total_seconds: difference / MS_PER_SECOND,
        is_complete: false,
    }
}
