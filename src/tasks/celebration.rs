//! Celebration background task

use std::sync::Arc;
use rand::{rngs::StdRng, SeedableRng};
use tokio::{
    sync::watch,
    time::{interval, Instant},
};
use tracing::{debug, info};

use super::{stop_channel, LoopHandle};
use crate::{
    effects::{Burst, EffectsPort, FireworksShow},
    state::{CountdownState, Frame},
};

/// Spawn the task that runs the fireworks show whenever the countdown completes
pub fn spawn_celebration(
    state: Arc<CountdownState>,
    show: FireworksShow,
    effects: Box<dyn EffectsPort>,
) -> LoopHandle {
    let (stop_tx, stop_rx) = stop_channel();
    let join = tokio::spawn(celebration_task(state.subscribe(), show, effects, stop_rx));
    LoopHandle::new("celebration", stop_tx, join)
}

fn fire(effects: &mut dyn EffectsPort, burst: Burst) {
    effects.trigger_burst(burst.origin_x, burst.origin_y, burst.intensity);
}

async fn celebration_task(
    mut frames: watch::Receiver<Frame>,
    show: FireworksShow,
    mut effects: Box<dyn EffectsPort>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut rng = StdRng::from_entropy();

    loop {
        let active = frames.borrow_and_update().celebration_active;
        if active {
            info!("Celebration started");
            fire(effects.as_mut(), show.opening_burst());

            let started = Instant::now();
            let mut ticker = interval(show.interval);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match show.step(started.elapsed(), &mut rng) {
                            Some(bursts) => {
                                for burst in bursts {
                                    fire(effects.as_mut(), burst);
                                }
                            }
                            None => {
                                info!("Celebration finished");
                                break;
                            }
                        }
                    }
                    changed = frames.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        let still_active = frames.borrow_and_update().celebration_active;
                        if !still_active {
                            info!("Celebration interrupted");
                            break;
                        }
                    }
                    _ = stop_rx.changed() => return,
                }
            }
        }

        // Wait for the next completion
        tokio::select! {
            changed = frames.changed() => {
                if changed.is_err() {
                    debug!("Frame channel closed, celebration task exiting");
                    return;
                }
            }
            _ = stop_rx.changed() => return,
        }
    }
}
