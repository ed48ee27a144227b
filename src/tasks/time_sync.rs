//! One-shot time synchronization task

use std::sync::Arc;
use tracing::{error, info};

use crate::{
    countdown::{resolve_offset, TimeSource},
    state::CountdownState,
};

/// Resolve the clock offset once and move the countdown out of Loading
pub async fn time_sync_task(state: Arc<CountdownState>, source: TimeSource) {
    info!("Synchronizing with {}", source.url);

    let offset = resolve_offset(&source, state.clock()).await;

    if let Err(e) = state.set_offset(offset) {
        error!("Failed to record clock offset: {}", e);
    }
}
