//! Shared countdown state

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, FixedOffset};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{AppState, CountdownMachine, Frame, MachineConfig, Tick, TransitionError};
use crate::{countdown::Clock, effects::AudioEngine};

/// Failures of shared state operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("failed to lock {0}")]
    Poisoned(&'static str),
}

/// Everything the status endpoint reports
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub frame: Frame,
    pub network_offset_ms: i64,
    pub test_offset_ms: i64,
    pub target: DateTime<FixedOffset>,
    pub critical_threshold_seconds: i64,
}

/// Process-wide countdown state shared by the frame loop and the HTTP handlers
pub struct CountdownState {
    machine: Mutex<CountdownMachine>,
    /// Audio engine, only initialized from `start`
    audio: Mutex<Box<dyn AudioEngine>>,
    clock: Arc<dyn Clock>,
    target: DateTime<FixedOffset>,
    pub start_time: Instant,
    /// Latest frame for the render layer
    frame_tx: watch::Sender<Frame>,
}

impl CountdownState {
    pub fn new(
        target: DateTime<FixedOffset>,
        critical_threshold_seconds: i64,
        test_lead_seconds: i64,
        clock: Arc<dyn Clock>,
        audio: Box<dyn AudioEngine>,
    ) -> Self {
        let machine = CountdownMachine::new(MachineConfig {
            target_ms: target.timestamp_millis(),
            critical_threshold_seconds,
            test_lead_seconds,
        });
        let (frame_tx, _) = watch::channel(machine.frame());

        Self {
            machine: Mutex::new(machine),
            audio: Mutex::new(audio),
            clock,
            target,
            start_time: Instant::now(),
            frame_tx,
        }
    }

    pub fn target(&self) -> DateTime<FixedOffset> {
        self.target
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Subscribe to frame updates. Only changed frames are published.
    pub fn subscribe(&self) -> watch::Receiver<Frame> {
        self.frame_tx.subscribe()
    }

    /// Latest published frame
    pub fn frame(&self) -> Frame {
        *self.frame_tx.borrow()
    }

    pub fn app_state(&self) -> AppState {
        self.frame().state
    }

    /// Record the resolved clock offset and become ready to start
    pub fn set_offset(&self, offset_ms: i64) -> Result<Frame, StateError> {
        let mut machine = self.lock_machine()?;
        machine.offset_resolved(offset_ms)?;
        info!("Clock offset set to {}ms, ready to start", offset_ms);
        Ok(self.publish(machine.frame()))
    }

    /// Start the countdown. This is the only place audio output is acquired.
    ///
    /// The machine stays locked until audio is up, so no frame can reach
    /// Running with an uninitialized engine.
    pub fn start(&self) -> Result<Frame, StateError> {
        let mut machine = self.lock_machine()?;
        machine.can_start()?;

        if let Err(e) = self.lock_audio()?.init() {
            warn!("Audio engine failed to initialize, continuing silently: {}", e);
        }
        machine.start()?;

        // First frame right away so the caller sees live numbers
        match machine.tick(self.clock.now_ms()) {
            Some(tick) => self.apply(tick),
            None => Ok(self.publish(machine.frame())),
        }
    }

    /// Diagnostic re-entry into Running with the target a few seconds away
    pub fn trigger_test(&self) -> Result<Frame, StateError> {
        let mut machine = self.lock_machine()?;
        machine.trigger_test(self.clock.now_ms())?;
        Ok(self.publish(machine.frame()))
    }

    /// Advance the countdown to the clock's current time and play any due cues.
    ///
    /// Returns `None` while the countdown has not started.
    pub fn tick(&self) -> Result<Option<Frame>, StateError> {
        let mut machine = self.lock_machine()?;
        match machine.tick(self.clock.now_ms()) {
            Some(tick) => self.apply(tick).map(Some),
            None => Ok(None),
        }
    }

    pub fn snapshot(&self) -> Result<StatusSnapshot, StateError> {
        let (network_offset_ms, test_offset_ms, critical_threshold_seconds) =
            self.with_machine(|machine| {
                Ok((
                    machine.network_offset_ms(),
                    machine.test_offset_ms(),
                    machine.config().critical_threshold_seconds,
                ))
            })?;

        Ok(StatusSnapshot {
            frame: self.frame(),
            network_offset_ms,
            test_offset_ms,
            target: self.target,
            critical_threshold_seconds,
        })
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    fn with_machine<T, F>(&self, f: F) -> Result<T, StateError>
    where
        F: FnOnce(&mut CountdownMachine) -> Result<T, TransitionError>,
    {
        let mut machine = self.lock_machine()?;
        Ok(f(&mut machine)?)
    }

    // Lock order is always machine, then audio.
    fn lock_machine(&self) -> Result<MutexGuard<'_, CountdownMachine>, StateError> {
        self.machine
            .lock()
            .map_err(|_| StateError::Poisoned("countdown machine"))
    }

    fn lock_audio(&self) -> Result<MutexGuard<'_, Box<dyn AudioEngine>>, StateError> {
        self.audio.lock().map_err(|_| StateError::Poisoned("audio engine"))
    }

    /// Play the cues of a tick and publish its frame. Called with the machine locked.
    fn apply(&self, tick: Tick) -> Result<Frame, StateError> {
        if tick.play_tick || tick.play_final_cue {
            let mut audio = self.lock_audio()?;
            if tick.play_tick {
                debug!("Tick cue at {}s", tick.frame.time_left.total_seconds);
                audio.play_tick();
            }
            if tick.play_final_cue {
                info!("Countdown complete, playing final cue");
                audio.play_final_cue();
            }
        }
        Ok(self.publish(tick.frame))
    }

    fn publish(&self, frame: Frame) -> Frame {
        self.frame_tx.send_if_modified(|current| {
            if *current == frame {
                false
            } else {
                *current = frame;
                true
            }
        });
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        countdown::{ManualClock, TimeLeft},
        effects::{AudioError, Cue},
    };

    const TARGET_ISO: &str = "2026-01-01T00:00:00+08:00";

    /// Records cues into a shared log so tests can inspect them after boxing.
    /// Like a real engine, cues before a successful init are dropped.
    struct RecordingAudio {
        log: Arc<Mutex<Vec<&'static str>>>,
        fail_init: bool,
        initialized: bool,
    }

    impl RecordingAudio {
        fn record(&self, played: &'static str, dropped: &'static str) {
            let entry = if self.initialized { played } else { dropped };
            self.log.lock().unwrap().push(entry);
        }
    }

    impl AudioEngine for RecordingAudio {
        fn init(&mut self) -> Result<(), AudioError> {
            self.log.lock().unwrap().push("init");
            if self.fail_init {
                Err(AudioError::Unavailable("no device".to_string()))
            } else {
                self.initialized = true;
                Ok(())
            }
        }

        fn play_tick(&mut self) {
            assert_eq!(Cue::TICK.frequency_hz, 1000.0);
            self.record("tick", "dropped tick");
        }

        fn play_final_cue(&mut self) {
            self.record("final", "dropped final");
        }
    }

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn setup(fail_init: bool) -> (CountdownState, Arc<ManualClock>, Log) {
        setup_before_target(fail_init, 12_500)
    }

    fn setup_before_target(fail_init: bool, lead_ms: i64) -> (CountdownState, Arc<ManualClock>, Log) {
        let target = DateTime::parse_from_rfc3339(TARGET_ISO).unwrap();
        let clock = Arc::new(ManualClock::new(target.timestamp_millis() - lead_ms));
        let log = Arc::new(Mutex::new(Vec::new()));
        let audio = RecordingAudio {
            log: Arc::clone(&log),
            fail_init,
            initialized: false,
        };
        let state = CountdownState::new(target, 10, 15, clock.clone(), Box::new(audio));
        (state, clock, log)
    }

    #[test]
    fn audio_is_not_initialized_before_start() {
        let (state, _clock, log) = setup(false);
        state.set_offset(0).unwrap();
        assert_eq!(state.tick().unwrap(), None);
        assert!(log.lock().unwrap().is_empty());

        state.start().unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["init"]);
    }

    #[test]
    fn start_before_sync_is_rejected() {
        let (state, _clock, log) = setup(false);
        let err = state.start().unwrap_err();
        assert!(matches!(err, StateError::Transition(_)));
        assert_eq!(state.app_state(), AppState::Loading);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_audio_init_still_runs() {
        let (state, _clock, _log) = setup(true);
        state.set_offset(0).unwrap();
        let frame = state.start().unwrap();
        assert_eq!(frame.state, AppState::Running);
        assert_eq!(frame.time_left.total_seconds, 12);
    }

    #[test]
    fn plays_ticks_then_one_final_cue() {
        let (state, clock, log) = setup(false);
        state.set_offset(0).unwrap();
        state.start().unwrap();

        // ~60 Hz frames across the last 12.5 seconds and beyond
        for _ in 0..1_000 {
            clock.advance(16);
            state.tick().unwrap();
        }

        let log = log.lock().unwrap();
        let ticks = log.iter().filter(|cue| **cue == "tick").count();
        let finals = log.iter().filter(|cue| **cue == "final").count();
        // 10..=1 plus the final sub-second reading 0
        assert_eq!(ticks, 11);
        assert_eq!(finals, 1);
        assert_eq!(log.last(), Some(&"final"));
        assert_eq!(state.app_state(), AppState::Complete);
        assert_eq!(state.frame().time_left, TimeLeft::complete());
    }

    #[test]
    fn frame_loop_racing_start_never_drops_a_tick() {
        for round in 0..2_000 {
            let (state, _clock, log) = setup_before_target(false, 5_500);
            state.set_offset(0).unwrap();

            std::thread::scope(|scope| {
                scope.spawn(|| {
                    for _ in 0..50 {
                        state.tick().unwrap();
                    }
                });
                state.start().unwrap();
            });

            let log = log.lock().unwrap();
            assert!(!log.contains(&"dropped tick"), "round {round}: {:?}", *log);
            assert_eq!(log.iter().filter(|cue| **cue == "tick").count(), 1, "round {round}");
        }
    }

    #[test]
    fn published_frame_matches_machine_after_racing_test_trigger() {
        for round in 0..2_000 {
            let (state, clock, _log) = setup(false);
            state.set_offset(0).unwrap();
            state.start().unwrap();
            clock.advance(60_000);
            state.tick().unwrap();
            assert_eq!(state.app_state(), AppState::Complete);

            std::thread::scope(|scope| {
                scope.spawn(|| {
                    for _ in 0..50 {
                        state.tick().unwrap();
                    }
                });
                state.trigger_test().unwrap();
            });

            let machine_frame = state.with_machine(|machine| Ok(machine.frame())).unwrap();
            assert_eq!(state.frame(), machine_frame, "round {round}");
            assert_eq!(state.app_state(), AppState::Running, "round {round}");
        }
    }

    #[test]
    fn subscribers_see_state_changes() {
        let (state, _clock, _log) = setup(false);
        let mut rx = state.subscribe();
        state.set_offset(0).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().state, AppState::ReadyToStart);
    }

    #[test]
    fn snapshot_reports_offsets() {
        let (state, clock, _log) = setup(false);
        state.set_offset(250).unwrap();
        state.start().unwrap();
        clock.advance(60_000);
        state.tick().unwrap();
        state.trigger_test().unwrap();

        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.network_offset_ms, 250);
        assert_eq!(snapshot.frame.state, AppState::Running);
        assert_eq!(snapshot.frame.time_left.total_seconds, 15);
        assert_eq!(snapshot.critical_threshold_seconds, 10);
    }
}
