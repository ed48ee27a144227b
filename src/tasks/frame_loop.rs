//! Frame loop background task

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use super::{stop_channel, LoopHandle};
use crate::state::CountdownState;

/// Spawn the loop that ticks the countdown every `period`.
///
/// Every tick recomputes from the absolute clock, so the period only sets the
/// display refresh rate.
pub fn spawn_frame_loop(state: Arc<CountdownState>, period: Duration) -> LoopHandle {
    let (stop_tx, stop_rx) = stop_channel();
    let join = tokio::spawn(frame_loop_task(state, period, stop_rx));
    LoopHandle::new("frame loop", stop_tx, join)
}

async fn frame_loop_task(state: Arc<CountdownState>, period: Duration, mut stop_rx: watch::Receiver<bool>) {
    info!("Starting frame loop ({:?} per frame)", period);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = state.tick() {
                    error!("Frame tick failed: {}", e);
                }
            }
            _ = stop_rx.changed() => {
                debug!("Frame loop stop requested");
                break;
            }
        }
    }

    info!("Frame loop stopped");
}
