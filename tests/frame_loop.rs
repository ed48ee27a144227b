use std::{sync::Arc, time::Duration};

use chrono::{DateTime, FixedOffset, Utc};
use countdown_sync::{
    countdown::{Clock, ManualClock, SystemClock},
    effects::{EffectsPort, FireworksShow, TerminalAudio},
    state::{AppState, CountdownState},
    tasks::{spawn_celebration, spawn_frame_loop},
};
use tokio::time::{sleep, timeout};

fn state_with(target: DateTime<FixedOffset>, clock: Arc<dyn Clock>) -> Arc<CountdownState> {
    Arc::new(CountdownState::new(
        target,
        10,
        15,
        clock,
        Box::new(TerminalAudio::with_writer(Vec::new(), false)),
    ))
}

#[tokio::test]
async fn five_seconds_out_reads_four_or_five_and_decreases() {
    let target = (Utc::now() + chrono::Duration::milliseconds(5_000)).fixed_offset();
    let state = state_with(target, Arc::new(SystemClock));
    state.set_offset(0).unwrap();
    let first = state.start().unwrap().time_left.total_seconds;
    assert!(first == 4 || first == 5, "first {first}");

    let mut previous = first;
    for _ in 0..5 {
        sleep(Duration::from_millis(5)).await;
        let frame = state.tick().unwrap().expect("running countdown ticks");
        assert!(frame.time_left.total_seconds <= previous);
        previous = frame.time_left.total_seconds;
    }
}

#[tokio::test]
async fn frame_loop_drives_to_completion_and_stops() {
    let target = DateTime::parse_from_rfc3339("2026-01-01T00:00:00+08:00").unwrap();
    let clock = Arc::new(ManualClock::new(target.timestamp_millis() - 2_000));
    let state = state_with(target, clock.clone());
    state.set_offset(0).unwrap();
    state.start().unwrap();

    let mut frames = state.subscribe();
    let handle = spawn_frame_loop(Arc::clone(&state), Duration::from_millis(1));
    clock.advance(3_000);

    timeout(Duration::from_secs(2), async {
        while frames.borrow_and_update().state != AppState::Complete {
            frames.changed().await.unwrap();
        }
    })
    .await
    .expect("countdown should complete");

    assert!(!handle.is_finished());
    handle.stop().await;
    assert_eq!(state.app_state(), AppState::Complete);
}

/// Counts bursts through a shared counter
struct CountingEffects(Arc<std::sync::atomic::AtomicUsize>);

impl EffectsPort for CountingEffects {
    fn trigger_burst(&mut self, _origin_x: f64, _origin_y: f64, _intensity: f64) {
        self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[tokio::test]
async fn celebration_bursts_only_after_completion() {
    let target = DateTime::parse_from_rfc3339("2026-01-01T00:00:00+08:00").unwrap();
    let clock = Arc::new(ManualClock::new(target.timestamp_millis() - 1_500));
    let state = state_with(target, clock.clone());
    let bursts = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let show = FireworksShow::new(Duration::from_millis(100), Duration::from_millis(10));
    let handle = spawn_celebration(
        Arc::clone(&state),
        show,
        Box::new(CountingEffects(Arc::clone(&bursts))),
    );

    state.set_offset(0).unwrap();
    state.start().unwrap();
    sleep(Duration::from_millis(30)).await;
    assert_eq!(bursts.load(std::sync::atomic::Ordering::SeqCst), 0);

    clock.advance(2_000);
    state.tick().unwrap();
    sleep(Duration::from_millis(200)).await;

    // Opening burst plus at least one pair before the show ran out
    let fired = bursts.load(std::sync::atomic::Ordering::SeqCst);
    assert!(fired >= 3, "fired {fired}");
    assert_eq!(fired % 2, 1);
    handle.stop().await;
}
