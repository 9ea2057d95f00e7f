//! Traits for the underlying decode/render engine
//!
//! The engine (a playbin-style pipeline) is consumed, not implemented,
//! by this crate. These traits are the seam: a real binding adapts its
//! native handle to [`Engine`] and its video sink to
//! [`VideoSink`](super::sample::VideoSink); tests drive the controller
//! through mock implementations.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::message::EngineMessage;
use super::time::ClockTime;
use crate::error::PlayerError;
use crate::format::VideoFormat;
use crate::netclock::SyncClock;

/// Engine lifecycle states, ordered `Null < Ready < Paused < Playing`.
///
/// Transitions are bidirectional between adjacent states; `Null` is
/// terminal on disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EngineState {
    /// No resources allocated.
    Null,
    /// Resources allocated, stream not negotiated.
    Ready,
    /// Prerolled and paused; position/duration queries are valid.
    Paused,
    /// Actively streaming.
    Playing,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EngineState::Null => "Null",
            EngineState::Ready => "Ready",
            EngineState::Paused => "Paused",
            EngineState::Playing => "Playing",
        };
        write!(f, "{name}")
    }
}

/// Outcome of a state-transition request that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// The transition completed synchronously.
    Success,
    /// The transition will complete asynchronously; poll
    /// [`Engine::get_state`] or wait for `AsyncDone`.
    Async,
    /// The transition succeeded but the stream cannot preroll (live
    /// sources paused).
    NoPreroll,
}

/// Behavioral flags attached to a seek request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeekFlags {
    /// Discard buffers in flight immediately instead of draining them.
    pub flush: bool,
    /// Seek to the exact requested time, not the nearest keyframe.
    pub accurate: bool,
    /// Emit a segment-done notification at the boundary instead of
    /// terminating the stream.
    pub segment: bool,
}

impl SeekFlags {
    /// The flags every explicit seek carries: `flush | accurate`.
    pub fn flush_accurate() -> Self {
        SeekFlags { flush: true, accurate: true, segment: false }
    }

    /// `accurate` only, for in-segment continuation seeks.
    pub fn accurate() -> Self {
        SeekFlags { flush: false, accurate: true, segment: false }
    }

    /// Copy of `self` with the segment flag set.
    pub fn with_segment(mut self, segment: bool) -> Self {
        self.segment = segment;
        self
    }
}

/// Interpretation of one edge of a seek request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekType {
    /// The accompanying time is an absolute position.
    Set,
    /// The accompanying time is relative to the end of the media.
    End,
    /// Leave this edge of the segment unchanged.
    NoChange,
}

/// Frame-step event payload, sent while paused to advance by discrete
/// frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent {
    /// Number of frames to advance.
    pub frames: u64,
    /// Playback rate magnitude to apply to the stepped material.
    pub rate: f64,
}

/// The decode/render engine consumed by the playback controller.
///
/// Implementations must be cheap to call from the control thread:
/// `seek` and `send_event` submit commands whose completion arrives as
/// bus messages, they do not wait for it.
pub trait Engine: Send + Sync {
    /// Request a state transition.
    ///
    /// A refused transition is fatal for the call; the pipeline is
    /// considered unusable for that request and no retry is attempted.
    fn set_state(&self, state: EngineState) -> Result<StateChange, PlayerError>;

    /// Poll the last requested transition. Returns the outcome together
    /// with the current and pending states. `timeout` of
    /// [`ClockTime::NONE`] blocks until the transition settles.
    fn get_state(
        &self,
        timeout: ClockTime,
    ) -> Result<(StateChange, EngineState, EngineState), PlayerError>;

    /// Submit a seek. Returns `false` if the engine rejected it
    /// (recoverable; the caller clears its in-flight flag and may retry
    /// on a later tick).
    fn seek(
        &self,
        rate: f64,
        flags: SeekFlags,
        start_type: SeekType,
        start: ClockTime,
        stop_type: SeekType,
        stop: ClockTime,
    ) -> bool;

    /// Query the current stream position. `None` when the query fails;
    /// the caller keeps its cached value.
    fn query_position(&self) -> Option<ClockTime>;

    /// Query the media duration. `None` when not yet known.
    fn query_duration(&self) -> Option<ClockTime>;

    /// Send a frame-step event downstream.
    fn send_event(&self, event: StepEvent) -> bool;

    /// Point the engine at a new source URI. Only valid while the
    /// engine is at `Ready` or below.
    fn set_uri(&self, uri: &str);

    /// Set the audio volume, linear `0.0..=1.0`.
    fn set_volume(&self, volume: f64);

    /// Constrain the video sink to deliver samples in `format`.
    /// Fails when the engine has no element for that format.
    fn configure_sink_format(&self, format: VideoFormat) -> Result<(), PlayerError>;

    /// Bind the engine's timing source to a shared clock, enabling
    /// multi-machine synchronization.
    fn set_clock(&self, clock: Arc<dyn SyncClock>);

    /// Take the receiving end of the engine bus. Yields `Some` exactly
    /// once; the playback controller becomes the single bus consumer.
    fn take_bus(&self) -> Option<mpsc::Receiver<EngineMessage>>;
}

/// Drive a state transition to completion on the calling thread.
///
/// Async transitions are polled until the engine settles; `NoPreroll`
/// counts as settled (live sources cannot preroll while paused).
pub fn set_state_blocking(engine: &dyn Engine, state: EngineState) -> Result<(), PlayerError> {
    match engine.set_state(state)? {
        StateChange::Success | StateChange::NoPreroll => Ok(()),
        StateChange::Async => loop {
            let (outcome, _current, _pending) = engine.get_state(ClockTime::NONE)?;
            match outcome {
                StateChange::Success | StateChange::NoPreroll => return Ok(()),
                StateChange::Async => continue,
            }
        },
    }
}
