//! Cue de-duplication state

/// Tracks which cues already fired so a cue plays once per second value
/// (ticks) or once per completion (final cue), whatever the frame rate.
#[derive(Debug, Clone, Default)]
pub struct TickTracker {
    last_seen_seconds: Option<i64>,
    final_cue_fired: bool,
}

impl TickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything. Called on every entry into Running.
    pub fn reset(&mut self) {
        self.last_seen_seconds = None;
        self.final_cue_fired = false;
    }

    /// Record an observed `total_seconds` and report whether a tick cue should fire
    pub fn observe(&mut self, total_seconds: i64, threshold_seconds: i64) -> bool {
        if total_seconds > threshold_seconds || self.last_seen_seconds == Some(total_seconds) {
            return false;
        }
        self.last_seen_seconds = Some(total_seconds);
        true
    }

    /// Claim the final cue. True only the first time after a reset.
    pub fn claim_final_cue(&mut self) -> bool {
        !std::mem::replace(&mut self.final_cue_fired, true)
    }

    pub fn last_seen_seconds(&self) -> Option<i64> {
        self.last_seen_seconds
    }

    pub fn final_cue_fired(&self) -> bool {
        self.final_cue_fired
    }
}
