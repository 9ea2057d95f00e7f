//! Playback controller
//!
//! Owns the engine handle and the seek/loop state machine. The
//! application calls [`PlaybackController::update`] once per tick with
//! its full intent; the controller diffs that against the session,
//! issues the minimal set of engine commands, and reacts to the
//! engine's asynchronous bus traffic (drained here, on the control
//! thread, so engine worker threads never mutate session state).
//!
//! # Seek serialization
//!
//! At most one seek is outstanding. New requests that arrive while one
//! is in flight are deferred and issued when the completion
//! notification arrives. Segment-boundary handling is therefore always
//! serialized behind the previous seek's completion.

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::mpsc;

use super::seek::{self, SeekRequest};
use super::session::{PlaybackSession, PlaybackStatus, SharedStatus, UpdateParams};
use crate::engine::{
    ClockTime, Engine, EngineMessage, EngineState, StepEvent, VideoSink, set_state_blocking,
};
use crate::error::{EngineIncident, IncidentSeverity, PlayerError};
use crate::format::{self, PixelFormat};
use crate::frame::{DeliveryMode, FrameSource, SinkSignal};
use crate::netclock::SyncClock;

/// Drives one engine instance through state, seek and loop changes.
pub struct PlaybackController {
    engine: Arc<dyn Engine>,
    sink: Arc<dyn VideoSink>,
    bus: mpsc::Receiver<EngineMessage>,
    session: PlaybackSession,
    shared: Arc<SharedStatus>,
    last_incident: Option<EngineIncident>,
}

impl PlaybackController {
    /// Build a controller around an engine and its video sink.
    ///
    /// The requested pixel format is validated eagerly: an unsupported
    /// format fails here, before the engine is asked to negotiate or
    /// change state. On success the engine is brought to `Ready`.
    pub fn new(
        engine: Arc<dyn Engine>,
        sink: Arc<dyn VideoSink>,
        pixel_format: PixelFormat,
    ) -> Result<Self, PlayerError> {
        let video_format = format::pixel_to_video(pixel_format)?;
        engine.configure_sink_format(video_format)?;
        let bus = engine
            .take_bus()
            .ok_or_else(|| PlayerError::ElementCreation("engine bus already taken".into()))?;
        set_state_blocking(&*engine, EngineState::Ready)?;

        Ok(PlaybackController {
            engine,
            sink,
            bus,
            session: PlaybackSession::new(),
            shared: Arc::new(SharedStatus::new()),
            last_incident: None,
        })
    }

    /// Atomic view of the session for other threads.
    pub fn shared_status(&self) -> Arc<SharedStatus> {
        self.shared.clone()
    }

    /// Build a frame source over this controller's sink. Frame
    /// delivery runs independently of the update tick.
    pub fn frame_source(
        &self,
        signals: mpsc::Receiver<SinkSignal>,
        mode: DeliveryMode,
    ) -> FrameSource {
        FrameSource::new(self.sink.clone(), signals, mode)
    }

    /// Bind the engine's timing source to a shared clock.
    pub fn set_clock(&self, clock: Arc<dyn SyncClock>) {
        self.engine.set_clock(clock);
    }

    /// The most recent engine-reported error or warning, if any.
    pub fn last_incident(&self) -> Option<&EngineIncident> {
        self.last_incident.as_ref()
    }

    /// Apply one tick of application intent.
    ///
    /// Engine commands are issued only for parameters that changed
    /// since the last tick; an identical call is a no-op apart from
    /// position/duration queries. State-transition failures are fatal
    /// and propagate; seek rejections are recoverable and the rejected
    /// request is re-issued on the next tick unless a newer seek
    /// supersedes it.
    pub fn update(&mut self, params: &UpdateParams) -> Result<PlaybackStatus, PlayerError> {
        // Taken before the drain so a seek rejected while handling this
        // tick's messages waits for the next tick instead of being
        // retried immediately.
        let retry = self.session.retry_seek.take();
        self.drain_bus();

        let source_changed = self.apply_uri(params)?;
        self.apply_play(params)?;
        self.apply_volume(params);
        self.apply_step(params);

        let mut reposition = self.apply_rate(params);
        reposition |= self.apply_loop(params);

        if let Some(target) = self.apply_seek(params) {
            self.request_seek(target);
        } else if reposition && self.session.current_state >= EngineState::Paused {
            // Make the new rate or loop mode take effect from the
            // current position.
            self.request_seek(self.session.position.as_seconds().max(0.0));
        } else if let Some(request) = retry {
            // A seek the engine rejected on an earlier tick. Dropped if
            // anything newer superseded it meanwhile: a seek issued or
            // rejected during the drain, or a source change.
            if !source_changed
                && !self.session.seek_in_flight
                && self.session.retry_seek.is_none()
            {
                self.submit_seek(request);
            }
        }

        Ok(self.poll_progress())
    }

    // --- bus handling -----------------------------------------------------

    fn drain_bus(&mut self) {
        loop {
            let message = match self.bus.try_recv() {
                Ok(message) => message,
                Err(_) => break,
            };
            self.handle_message(message);
        }
    }

    fn handle_message(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::StateChanged { old, new } => {
                debug!("engine state {old} -> {new}");
                self.session.current_state = new;
                self.shared.set_state(new);
            }
            EngineMessage::AsyncDone => {
                self.session.seek_in_flight = false;
                self.shared.set_seeking(false);
                if let Some(request) = self.session.pending_seek.take() {
                    self.issue_seek(request);
                }
            }
            EngineMessage::SegmentDone { position } => {
                self.handle_segment_done(position, false);
            }
            EngineMessage::Eos => {
                info!("end of stream");
                self.session.eos = true;
                self.shared.set_eos(true);
                if self.session.looping {
                    // The engine has fully stopped; rejoin the loop
                    // window with a flushing seek.
                    self.handle_segment_done(self.session.position, true);
                }
            }
            EngineMessage::DurationChanged => {
                self.session.duration = None;
            }
            EngineMessage::Error { source, message } => {
                error!("engine error from {source}: {message}");
                self.last_incident = Some(EngineIncident {
                    severity: IncidentSeverity::Error,
                    source,
                    message,
                });
            }
            EngineMessage::Warning { source, message } => {
                warn!("engine warning from {source}: {message}");
                self.last_incident = Some(EngineIncident {
                    severity: IncidentSeverity::Warning,
                    source,
                    message,
                });
            }
        }
    }

    /// React to a segment boundary (or, with `via_eos`, to end of
    /// stream while looping).
    fn handle_segment_done(&mut self, position: ClockTime, via_eos: bool) {
        let position_secs = position.as_seconds();
        let session = &self.session;

        if !session.looping {
            // Looping was switched off mid-segment: continue from here
            // with segment mode cleared so the stream runs to its
            // natural end.
            let mut request = seek::build_seek(session.rate, position_secs.max(0.0), false, 0.0, None);
            request.flags.flush = false;
            self.submit_seek(request);
            return;
        }

        let (applied_start, applied_end) = session
            .applied_segment
            .unwrap_or((session.loop_start, session.loop_end));
        let within = via_eos
            || in_window(position_secs, applied_start, applied_end)
            || in_window(position_secs, session.loop_start, session.loop_end);
        if !within {
            debug!("segment boundary at {position} outside loop window, continuing");
            let mut request = seek::build_seek(session.rate, position_secs.max(0.0), false, 0.0, None);
            request.flags.flush = false;
            self.submit_seek(request);
            return;
        }

        // Compare the window the running segment was issued with
        // against the window the application wants now.
        let forward = session.rate >= 0.0;
        let (far_outward, any_inward) = if forward {
            let far_outward = match (applied_end, session.loop_end) {
                (Some(applied), Some(current)) => current > applied,
                (Some(_), None) => true,
                _ => false,
            };
            let far_inward = match (applied_end, session.loop_end) {
                (Some(applied), Some(current)) => current < applied,
                (None, Some(_)) => true,
                _ => false,
            };
            let near_inward = session.loop_start > applied_start;
            (far_outward, far_inward || near_inward)
        } else {
            let far_outward = session.loop_start < applied_start;
            let far_inward = session.loop_start > applied_start;
            let near_inward = match (applied_end, session.loop_end) {
                (Some(applied), Some(current)) => current < applied,
                (None, Some(_)) => true,
                _ => false,
            };
            (far_outward, far_inward || near_inward)
        };

        let mut request = if far_outward && !any_inward && !via_eos {
            // The far boundary moved outward mid-segment: extend the
            // running segment in place instead of jumping.
            seek::extend_segment(session.rate, session.loop_start, session.loop_end)
        } else {
            seek::loop_seek(session.rate, session.loop_start, session.loop_end)
        };
        if via_eos {
            request.flags.flush = true;
        }
        self.submit_seek(request);
    }

    // --- parameter application --------------------------------------------

    /// Returns whether the source changed.
    fn apply_uri(&mut self, params: &UpdateParams) -> Result<bool, PlayerError> {
        let uri = params.uri.trim();
        if uri.is_empty() || Some(uri) == self.session.uri.as_deref() {
            return Ok(false);
        }

        info!("switching source to {uri}");
        // The engine cannot change source while streaming.
        set_state_blocking(&*self.engine, EngineState::Ready)?;
        self.engine.set_uri(uri);

        self.session.uri = Some(uri.to_owned());
        self.session.duration = None;
        self.session.position = ClockTime::ZERO;
        self.session.initial_seek_done = false;
        self.session.eos = false;
        self.shared.set_eos(false);
        // Outstanding seeks targeted the old stream.
        self.session.seek_in_flight = false;
        self.session.pending_seek = None;
        self.session.retry_seek = None;
        self.session.applied_segment = None;
        self.shared.set_seeking(false);

        if self.session.target_state > EngineState::Ready {
            set_state_blocking(&*self.engine, self.session.target_state)?;
        }
        Ok(true)
    }

    fn apply_play(&mut self, params: &UpdateParams) -> Result<(), PlayerError> {
        if params.play == self.session.play {
            return Ok(());
        }
        self.session.play = params.play;
        self.session.target_state = if params.play {
            EngineState::Playing
        } else {
            EngineState::Paused
        };
        set_state_blocking(&*self.engine, self.session.target_state)
    }

    fn apply_volume(&mut self, params: &UpdateParams) {
        if params.volume != self.session.volume {
            self.session.volume = params.volume;
            self.engine.set_volume(params.volume);
        }
    }

    fn apply_step(&mut self, params: &UpdateParams) {
        if params.step && !self.session.step {
            let event = StepEvent { frames: 1, rate: self.session.rate.abs().max(f64::MIN_POSITIVE) };
            if !self.engine.send_event(event) {
                warn!("engine refused frame-step event");
            }
        }
        self.session.step = params.step;
    }

    fn apply_rate(&mut self, params: &UpdateParams) -> bool {
        if params.rate == self.session.rate {
            return false;
        }
        self.session.rate = params.rate;
        true
    }

    fn apply_loop(&mut self, params: &UpdateParams) -> bool {
        let toggled = params.looping != self.session.looping;
        // Window edits while a segment is active are deferred to the
        // next boundary, where grow/shrink handling picks them up.
        self.session.loop_start = params.loop_start;
        self.session.loop_end = params.loop_end;
        self.session.looping = params.looping;
        toggled
    }

    /// Record the seek parameters and return the target time when a
    /// new explicit request should be issued.
    fn apply_seek(&mut self, params: &UpdateParams) -> Option<f64> {
        let new_request = params.seek
            && (!self.session.seek_active || params.seek_time != self.session.seek_time);
        self.session.seek_active = params.seek;
        self.session.seek_time = params.seek_time;
        new_request.then_some(params.seek_time)
    }

    // --- seek plumbing ----------------------------------------------------

    fn request_seek(&mut self, target: f64) {
        let request = seek::build_seek(
            self.session.rate,
            target,
            self.session.looping,
            self.session.loop_start,
            self.session.loop_end,
        );
        self.submit_seek(request);
    }

    /// Issue a seek, or defer it while one is outstanding. A deferred
    /// request replaces any earlier deferred one; the latest intent
    /// wins, including over a rejected request awaiting retry.
    fn submit_seek(&mut self, request: SeekRequest) {
        self.session.retry_seek = None;
        if self.session.seek_in_flight {
            self.session.pending_seek = Some(request);
            return;
        }
        self.issue_seek(request);
    }

    fn issue_seek(&mut self, mut request: SeekRequest) {
        // A non-flushing seek below Playing deadlocks the render
        // threads waiting on drained buffers.
        if self.session.current_state != EngineState::Playing {
            request.flags.flush = true;
        }

        let accepted = self.engine.seek(
            request.rate,
            request.flags,
            request.start_type,
            request.start,
            request.stop_type,
            request.stop,
        );
        if accepted {
            self.session.seek_in_flight = true;
            self.session.retry_seek = None;
            self.session.eos = false;
            self.session.applied_segment = if request.flags.segment {
                Some((self.session.loop_start, self.session.loop_end))
            } else {
                None
            };
            self.shared.set_seeking(true);
            self.shared.set_eos(false);
        } else {
            // Recoverable: the request is kept and re-issued on the
            // next tick unless something newer supersedes it. Loop
            // re-seeks depend on this, their segment-done trigger is
            // already consumed.
            self.session.seek_in_flight = false;
            self.session.retry_seek = Some(request);
            self.shared.set_seeking(false);
            warn!("engine rejected seek to {}", request.start);
        }
    }

    // --- progress ---------------------------------------------------------

    fn poll_progress(&mut self) -> PlaybackStatus {
        let state = self.session.current_state;
        if state < EngineState::Paused {
            return PlaybackStatus { state, position: -1.0, duration: -1.0 };
        }

        if !self.session.seek_in_flight {
            // A failed query keeps the cached value.
            if let Some(position) = self.engine.query_position() {
                self.session.position = position;
            }
        }

        if self.session.duration.is_none() {
            if let Some(duration) = self.engine.query_duration() {
                self.session.duration = Some(duration);
                if !self.session.initial_seek_done {
                    // First duration for this source: establish a known
                    // timeline position at the stored start time.
                    self.session.initial_seek_done = true;
                    self.request_seek(self.session.seek_time.max(0.0));
                }
            }
        }

        PlaybackStatus {
            state,
            position: self.session.position.as_seconds(),
            duration: self.session.duration.map_or(-1.0, ClockTime::as_seconds),
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Err(e) = set_state_blocking(&*self.engine, EngineState::Null) {
            warn!("engine shutdown failed: {e}");
        }
    }
}

fn in_window(position: f64, start: f64, end: Option<f64>) -> bool {
    position >= start && end.is_none_or(|end| position <= end)
}
