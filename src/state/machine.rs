//! Countdown state machine
//!
//! Pure sequencing logic. Callers pass in the local clock reading and act on
//! the cues reported back, so every transition is deterministic under test.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::{AppState, TickTracker};
use crate::countdown::{adjusted_now_ms, compute_time_left, TimeLeft};

/// Rejected transition requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {action} while {state}")]
    Invalid { action: &'static str, state: AppState },
}

impl TransitionError {
    pub fn state(&self) -> AppState {
        match self {
            TransitionError::Invalid { state, .. } => *state,
        }
    }
}

/// Fixed parameters of a countdown
#[derive(Debug, Clone, Copy)]
pub struct MachineConfig {
    /// Target instant in milliseconds since the Unix epoch
    pub target_ms: i64,
    pub critical_threshold_seconds: i64,
    /// Seconds left right after a diagnostic test trigger
    pub test_lead_seconds: i64,
}

/// Snapshot handed to the render layer on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub state: AppState,
    pub time_left: TimeLeft,
    pub is_critical: bool,
    pub celebration_active: bool,
}

/// Result of one tick: the frame plus the cues to play for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub frame: Frame,
    pub play_tick: bool,
    pub play_final_cue: bool,
}

#[derive(Debug, Clone)]
pub struct CountdownMachine {
    config: MachineConfig,
    state: AppState,
    network_offset_ms: i64,
    test_offset_ms: i64,
    time_left: TimeLeft,
    tracker: TickTracker,
}

impl CountdownMachine {
    pub fn new(config: MachineConfig) -> Self {
        Self {
            config,
            state: AppState::Loading,
            network_offset_ms: 0,
            test_offset_ms: 0,
            time_left: TimeLeft::pending(),
            tracker: TickTracker::new(),
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn network_offset_ms(&self) -> i64 {
        self.network_offset_ms
    }

    pub fn test_offset_ms(&self) -> i64 {
        self.test_offset_ms
    }

    pub fn tracker(&self) -> &TickTracker {
        &self.tracker
    }

    /// Current frame without advancing time
    pub fn frame(&self) -> Frame {
        Frame {
            state: self.state,
            time_left: self.time_left,
            is_critical: self.state == AppState::Running
                && self
                    .time_left
                    .is_critical(self.config.critical_threshold_seconds),
            celebration_active: self.state == AppState::Complete,
        }
    }

    /// Loading -> ReadyToStart once the offset (or its fallback) is known
    pub fn offset_resolved(&mut self, offset_ms: i64) -> Result<(), TransitionError> {
        self.expect_state(AppState::Loading, "resolve the clock offset")?;
        self.network_offset_ms = offset_ms;
        self.transition(AppState::ReadyToStart);
        Ok(())
    }

    /// Whether `start` would be accepted right now
    pub fn can_start(&self) -> Result<(), TransitionError> {
        self.expect_state(AppState::ReadyToStart, "start")
    }

    /// ReadyToStart -> Running on the user's start action
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.can_start()?;
        self.enter_running();
        Ok(())
    }

    /// Diagnostic re-entry into Running with the target `test_lead_seconds` away.
    ///
    /// Returns the time left at `local_now_ms` under the new test offset.
    pub fn trigger_test(&mut self, local_now_ms: i64) -> Result<TimeLeft, TransitionError> {
        if !self.state.is_ticking() {
            return Err(TransitionError::Invalid {
                action: "trigger test mode",
                state: self.state,
            });
        }

        let real_now = adjusted_now_ms(local_now_ms, self.network_offset_ms, 0);
        let real_difference = self.config.target_ms.saturating_sub(real_now);
        self.test_offset_ms =
            real_difference.saturating_sub(self.config.test_lead_seconds.saturating_mul(1000));
        info!(
            "Test mode: shifting clock by {}ms to put the target {}s away",
            self.test_offset_ms, self.config.test_lead_seconds
        );

        self.enter_running();
        self.time_left = compute_time_left(self.config.target_ms, self.adjusted_now_ms(local_now_ms));
        Ok(self.time_left)
    }

    /// Advance to `local_now_ms`. A no-op returning `None` before Running.
    pub fn tick(&mut self, local_now_ms: i64) -> Option<Tick> {
        if !self.state.is_ticking() {
            return None;
        }

        self.time_left = compute_time_left(self.config.target_ms, self.adjusted_now_ms(local_now_ms));
        let mut play_tick = false;
        let mut play_final_cue = false;

        if self.state == AppState::Running {
            if self.time_left.is_complete {
                play_final_cue = self.tracker.claim_final_cue();
                self.transition(AppState::Complete);
            } else {
                play_tick = self
                    .tracker
                    .observe(self.time_left.total_seconds, self.config.critical_threshold_seconds);
            }
        }

        Some(Tick {
            frame: self.frame(),
            play_tick,
            play_final_cue,
        })
    }

    fn adjusted_now_ms(&self, local_now_ms: i64) -> i64 {
        adjusted_now_ms(local_now_ms, self.network_offset_ms, self.test_offset_ms)
    }

    fn enter_running(&mut self) {
        self.tracker.reset();
        self.transition(AppState::Running);
    }

    fn expect_state(&self, expected: AppState, action: &'static str) -> Result<(), TransitionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(TransitionError::Invalid {
                action,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, next: AppState) {
        if self.state != next {
            info!("State transition: {} -> {}", self.state, next);
        }
        self.state = next;
    }
}
