//! Fireworks schedule and a log-backed effects port

use std::time::Duration;

use rand::Rng;
use tracing::info;

use super::EffectsPort;

/// One particle burst request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub origin_x: f64,
    pub origin_y: f64,
    pub intensity: f64,
}

/// Timeline of the celebration: a big opening burst, then paired side bursts
/// that fade out linearly over `duration`.
#[derive(Debug, Clone, Copy)]
pub struct FireworksShow {
    pub duration: Duration,
    pub interval: Duration,
}

impl FireworksShow {
    const OPENING_INTENSITY: f64 = 150.0;
    const PEAK_INTENSITY: f64 = 50.0;

    pub fn new(duration: Duration, interval: Duration) -> Self {
        Self { duration, interval }
    }

    /// Burst fired the moment the celebration starts
    pub fn opening_burst(&self) -> Burst {
        Burst {
            origin_x: 0.5,
            origin_y: 0.6,
            intensity: Self::OPENING_INTENSITY,
        }
    }

    /// Paired bursts for `elapsed` time into the show, `None` once it has ended.
    pub fn step<R: Rng>(&self, elapsed: Duration, rng: &mut R) -> Option<[Burst; 2]> {
        let remaining = self.duration.checked_sub(elapsed)?;
        if remaining.is_zero() {
            return None;
        }

        let intensity =
            Self::PEAK_INTENSITY * remaining.as_secs_f64() / self.duration.as_secs_f64();
        // Particles fall, so origins start a bit above a random height
        let left = Burst {
            origin_x: rng.gen_range(0.1..0.3),
            origin_y: rng.gen::<f64>() - 0.2,
            intensity,
        };
        let right = Burst {
            origin_x: rng.gen_range(0.7..0.9),
            origin_y: rng.gen::<f64>() - 0.2,
            intensity,
        };
        Some([left, right])
    }
}

impl Default for FireworksShow {
    fn default() -> Self {
        Self::new(Duration::from_secs(15), Duration::from_millis(250))
    }
}

/// Effects port that logs every burst
#[derive(Debug, Default)]
pub struct LogEffects {
    bursts: usize,
}

impl LogEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bursts(&self) -> usize {
        self.bursts
    }
}

impl EffectsPort for LogEffects {
    fn trigger_burst(&mut self, origin_x: f64, origin_y: f64, intensity: f64) {
        self.bursts += 1;
        info!(
            "Firework burst at ({:.2}, {:.2}) with {:.0} particles",
            origin_x, origin_y, intensity
        );
    }
}
