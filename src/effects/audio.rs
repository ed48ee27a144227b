//! Terminal-backed audio engine

use std::{
    io::{self, Write},
    time::Duration,
};
use tracing::{debug, info};

use super::{AudioEngine, AudioError};

/// Oscillator shape of a cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
}

/// A short synthesized tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub frequency_hz: f64,
    pub duration: Duration,
    pub gain: f64,
    pub waveform: Waveform,
}

impl Cue {
    /// High, short tick played once per second inside the critical window
    pub const TICK: Cue = Cue {
        frequency_hz: 1000.0,
        duration: Duration::from_millis(100),
        gain: 0.3,
        waveform: Waveform::Sine,
    };

    /// Low, long boom played when the countdown completes
    pub const FINAL: Cue = Cue {
        frequency_hz: 100.0,
        duration: Duration::from_millis(1500),
        gain: 0.5,
        waveform: Waveform::Square,
    };
}

/// Audio engine that rings the terminal bell and logs each cue
pub struct TerminalAudio<W: Write + Send = io::Stdout> {
    out: W,
    bell: bool,
    initialized: bool,
    #[cfg(test)]
    played: Vec<Cue>,
}

impl TerminalAudio<io::Stdout> {
    pub fn new(bell: bool) -> Self {
        Self::with_writer(io::stdout(), bell)
    }
}

impl<W: Write + Send> TerminalAudio<W> {
    pub fn with_writer(out: W, bell: bool) -> Self {
        Self {
            out,
            bell,
            initialized: false,
            #[cfg(test)]
            played: Vec::new(),
        }
    }

    fn play(&mut self, cue: Cue) {
        if !self.initialized {
            debug!("Audio not initialized, dropping {:?} cue", cue.waveform);
            return;
        }

        debug!(
            "Playing {:?} cue at {}Hz for {:?}",
            cue.waveform, cue.frequency_hz, cue.duration
        );
        if self.bell {
            // Bell output is best effort
            let _ = self.out.write_all(b"\x07").and_then(|_| self.out.flush());
        }
        #[cfg(test)]
        self.played.push(cue);
    }
}

impl<W: Write + Send> AudioEngine for TerminalAudio<W> {
    fn init(&mut self) -> Result<(), AudioError> {
        if self.initialized {
            return Ok(());
        }
        if self.bell {
            self.out
                .flush()
                .map_err(|e| AudioError::Unavailable(e.to_string()))?;
        }
        self.initialized = true;
        info!("Audio engine initialized (bell={})", self.bell);
        Ok(())
    }

    fn play_tick(&mut self) {
        self.play(Cue::TICK);
    }

    fn play_final_cue(&mut self) {
        self.play(Cue::FINAL);
    }
}
