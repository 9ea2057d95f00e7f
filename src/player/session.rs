//! Playback session state
//!
//! One mutable state block owned exclusively by the controller, plus a
//! small atomic mirror of the fields other threads legitimately want to
//! read (current state, seek-in-flight, EOS) without taking part in the
//! update tick.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use super::seek::SeekRequest;
use crate::engine::{ClockTime, EngineState};

/// Application intent for one update tick.
///
/// The controller diffs these against the previously applied values and
/// issues engine commands only for the fields that changed.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateParams {
    /// Source URI. Empty means "keep the current source".
    pub uri: String,
    /// Target `Playing` when true, `Paused` otherwise.
    pub play: bool,
    /// Playback rate; sign is direction, magnitude is speed.
    pub rate: f64,
    /// Advance one frame on the rising edge of this flag.
    pub step: bool,
    /// Request a seek to `seek_time`.
    pub seek: bool,
    /// Seek target in seconds. Also the start position established
    /// after a new source loads.
    pub seek_time: f64,
    /// Enable segment looping over the window below.
    pub looping: bool,
    /// Loop window start in seconds.
    pub loop_start: f64,
    /// Loop window end in seconds; `None` is open-ended.
    pub loop_end: Option<f64>,
    /// Linear audio volume `0.0..=1.0`.
    pub volume: f64,
}

impl Default for UpdateParams {
    fn default() -> Self {
        UpdateParams {
            uri: String::new(),
            play: false,
            rate: 1.0,
            step: false,
            seek: false,
            seek_time: 0.0,
            looping: false,
            loop_start: 0.0,
            loop_end: None,
            volume: 1.0,
        }
    }
}

/// What the controller reports back each tick.
///
/// Position and duration are `-1.0` while the engine is below `Paused`
/// or the value is not yet known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackStatus {
    pub state: EngineState,
    pub position: f64,
    pub duration: f64,
}

/// Mutable per-source session state. Private to the controller; the
/// engine's asynchronous reports flow in through the drained bus, never
/// by direct mutation from engine threads.
pub(crate) struct PlaybackSession {
    pub uri: Option<String>,
    /// State the application wants the engine in.
    pub target_state: EngineState,
    /// Last state the engine reported on the bus.
    pub current_state: EngineState,
    pub play: bool,
    pub rate: f64,
    pub volume: f64,
    /// Previous tick's step flag, for rising-edge detection.
    pub step: bool,
    /// Previous tick's seek flag and target.
    pub seek_active: bool,
    pub seek_time: f64,
    pub looping: bool,
    pub loop_start: f64,
    pub loop_end: Option<f64>,
    /// At most one seek is outstanding per session.
    pub seek_in_flight: bool,
    /// Seek requested while one was outstanding; issued on completion.
    pub pending_seek: Option<SeekRequest>,
    /// A rejected seek, re-issued on the next tick unless superseded.
    pub retry_seek: Option<SeekRequest>,
    pub eos: bool,
    /// Cached duration; `None` until known, invalidated by
    /// duration-changed notifications.
    pub duration: Option<ClockTime>,
    pub position: ClockTime,
    /// Whether the implicit start-position seek for the current source
    /// has been issued.
    pub initial_seek_done: bool,
    /// Loop window in effect for the segment currently playing, used to
    /// detect boundary moves at segment-done time.
    pub applied_segment: Option<(f64, Option<f64>)>,
}

impl PlaybackSession {
    pub fn new() -> Self {
        PlaybackSession {
            uri: None,
            target_state: EngineState::Ready,
            current_state: EngineState::Null,
            play: false,
            rate: 1.0,
            volume: 1.0,
            step: false,
            seek_active: false,
            seek_time: 0.0,
            looping: false,
            loop_start: 0.0,
            loop_end: None,
            seek_in_flight: false,
            pending_seek: None,
            retry_seek: None,
            eos: false,
            duration: None,
            position: ClockTime::ZERO,
            initial_seek_done: false,
            applied_segment: None,
        }
    }
}

/// Atomic mirror of the session fields shared across threads.
pub struct SharedStatus {
    state: AtomicU8,
    seeking: AtomicBool,
    eos: AtomicBool,
}

impl SharedStatus {
    pub(crate) fn new() -> Self {
        SharedStatus {
            state: AtomicU8::new(encode_state(EngineState::Null)),
            seeking: AtomicBool::new(false),
            eos: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> EngineState {
        decode_state(self.state.load(Ordering::Acquire))
    }

    pub fn seeking(&self) -> bool {
        self.seeking.load(Ordering::Acquire)
    }

    pub fn eos(&self) -> bool {
        self.eos.load(Ordering::Acquire)
    }

    pub(crate) fn set_state(&self, state: EngineState) {
        self.state.store(encode_state(state), Ordering::Release);
    }

    pub(crate) fn set_seeking(&self, seeking: bool) {
        self.seeking.store(seeking, Ordering::Release);
    }

    pub(crate) fn set_eos(&self, eos: bool) {
        self.eos.store(eos, Ordering::Release);
    }
}

fn encode_state(state: EngineState) -> u8 {
    match state {
        EngineState::Null => 0,
        EngineState::Ready => 1,
        EngineState::Paused => 2,
        EngineState::Playing => 3,
    }
}

fn decode_state(value: u8) -> EngineState {
    match value {
        1 => EngineState::Ready,
        2 => EngineState::Paused,
        3 => EngineState::Playing,
        _ => EngineState::Null,
    }
}
