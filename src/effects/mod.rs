//! Effects ports
//!
//! Narrow capability traits the countdown core drives, plus the terminal and
//! log-backed implementations used by the binary.

pub mod audio;
pub mod fireworks;

use thiserror::Error;

// Re-export main types
pub use audio::{Cue, TerminalAudio, Waveform};
pub use fireworks::{Burst, FireworksShow, LogEffects};

/// Audio output failures
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
}

/// Audio engine driven by the countdown.
///
/// `init` acquires output resources and may only be called from the explicit
/// start action. Cues played before `init` are dropped.
pub trait AudioEngine: Send {
    fn init(&mut self) -> Result<(), AudioError>;
    fn play_tick(&mut self);
    fn play_final_cue(&mut self);
}

/// Visual celebration capability
pub trait EffectsPort: Send {
    /// Fire one particle burst. Origins are fractions of the display, intensity a particle count.
    fn trigger_burst(&mut self, origin_x: f64, origin_y: f64, intensity: f64);
}
