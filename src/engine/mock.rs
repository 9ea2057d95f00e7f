//! Scriptable engine and sink doubles used across the crate's tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::sync::mpsc;

use super::message::{BUS_CAPACITY, EngineMessage};
use super::sample::{MappedData, Sample, SampleBuffer, SampleCaps, VideoSink};
use super::time::ClockTime;
use super::traits::{Engine, EngineState, SeekFlags, SeekType, StateChange, StepEvent};
use crate::error::{FrameError, PlayerError};
use crate::format::VideoFormat;
use crate::netclock::SyncClock;

/// Engine command recorded for assertion.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineCommand {
    SetState(EngineState),
    Seek {
        rate: f64,
        flags: SeekFlags,
        start_type: SeekType,
        start: ClockTime,
        stop_type: SeekType,
        stop: ClockTime,
    },
    Step(StepEvent),
    SetUri(String),
    SetVolume(f64),
    ConfigureSink(VideoFormat),
    SetClock,
}

struct MockEngineInner {
    state: EngineState,
    position: Option<ClockTime>,
    duration: Option<ClockTime>,
    commands: Vec<EngineCommand>,
}

/// A scriptable [`Engine`] that records every command and feeds the bus
/// the way a real engine would.
pub(crate) struct MockEngine {
    inner: Mutex<MockEngineInner>,
    bus_tx: mpsc::Sender<EngineMessage>,
    bus_rx: Mutex<Option<mpsc::Receiver<EngineMessage>>>,
    /// When set, `set_state` returns an error.
    pub fail_state_change: AtomicBool,
    /// When set, `seek` is rejected.
    pub reject_seek: AtomicBool,
    /// When set, accepted seeks push `AsyncDone` immediately.
    pub auto_async_done: AtomicBool,
    /// When cleared, `set_state` commits silently and the test scripts
    /// the `StateChanged` bus traffic itself.
    pub emit_state_hops: AtomicBool,
    /// Scripted outcomes for `set_state`, drained front to back;
    /// `Success` once empty.
    pub set_state_outcomes: Mutex<VecDeque<StateChange>>,
    /// Scripted outcomes for `get_state`, drained front to back;
    /// `Success` once empty.
    pub get_state_outcomes: Mutex<VecDeque<StateChange>>,
    /// Number of `get_state` polls observed.
    pub get_state_calls: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        let (bus_tx, bus_rx) = mpsc::channel(BUS_CAPACITY);
        Arc::new(MockEngine {
            inner: Mutex::new(MockEngineInner {
                state: EngineState::Null,
                position: None,
                duration: None,
                commands: Vec::new(),
            }),
            bus_tx,
            bus_rx: Mutex::new(Some(bus_rx)),
            fail_state_change: AtomicBool::new(false),
            reject_seek: AtomicBool::new(false),
            auto_async_done: AtomicBool::new(false),
            emit_state_hops: AtomicBool::new(true),
            set_state_outcomes: Mutex::new(VecDeque::new()),
            get_state_outcomes: Mutex::new(VecDeque::new()),
            get_state_calls: AtomicUsize::new(0),
        })
    }

    /// Push a bus message as the engine's worker threads would.
    pub fn push(&self, message: EngineMessage) {
        self.bus_tx.try_send(message).expect("bus overrun in test");
    }

    pub fn set_position(&self, position: ClockTime) {
        self.inner.lock().unwrap().position = Some(position);
    }

    pub fn set_duration(&self, duration: Option<ClockTime>) {
        self.inner.lock().unwrap().duration = duration;
    }

    pub fn commands(&self) -> Vec<EngineCommand> {
        self.inner.lock().unwrap().commands.clone()
    }

    pub fn command_count(&self) -> usize {
        self.inner.lock().unwrap().commands.len()
    }

    /// The seek commands recorded so far.
    pub fn seeks(&self) -> Vec<EngineCommand> {
        self.inner
            .lock()
            .unwrap()
            .commands
            .iter()
            .filter(|c| matches!(c, EngineCommand::Seek { .. }))
            .cloned()
            .collect()
    }

    fn record(&self, command: EngineCommand) {
        self.inner.lock().unwrap().commands.push(command);
    }

    /// Adjacent states walked from `from` to `to`, excluding `from`.
    fn hops(from: EngineState, to: EngineState) -> Vec<EngineState> {
        const ORDER: [EngineState; 4] = [
            EngineState::Null,
            EngineState::Ready,
            EngineState::Paused,
            EngineState::Playing,
        ];
        let from_idx = ORDER.iter().position(|s| *s == from).unwrap();
        let to_idx = ORDER.iter().position(|s| *s == to).unwrap();
        if from_idx <= to_idx {
            ORDER[from_idx + 1..=to_idx].to_vec()
        } else {
            let mut hops: Vec<_> = ORDER[to_idx..from_idx].to_vec();
            hops.reverse();
            hops
        }
    }
}

impl Engine for MockEngine {
    fn set_state(&self, state: EngineState) -> Result<StateChange, PlayerError> {
        self.record(EngineCommand::SetState(state));
        if self.fail_state_change.load(Ordering::SeqCst) {
            return Err(PlayerError::StateChange { requested: state });
        }
        let old = {
            let mut inner = self.inner.lock().unwrap();
            let old = inner.state;
            inner.state = state;
            old
        };
        // A real engine walks adjacent states and reports each hop.
        if self.emit_state_hops.load(Ordering::SeqCst) {
            let mut previous = old;
            for hop in Self::hops(old, state) {
                self.push(EngineMessage::StateChanged { old: previous, new: hop });
                previous = hop;
            }
        }
        let outcome = self
            .set_state_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(StateChange::Success);
        Ok(outcome)
    }

    fn get_state(
        &self,
        _timeout: ClockTime,
    ) -> Result<(StateChange, EngineState, EngineState), PlayerError> {
        self.get_state_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .get_state_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(StateChange::Success);
        let state = self.inner.lock().unwrap().state;
        Ok((outcome, state, state))
    }

    fn seek(
        &self,
        rate: f64,
        flags: SeekFlags,
        start_type: SeekType,
        start: ClockTime,
        stop_type: SeekType,
        stop: ClockTime,
    ) -> bool {
        self.record(EngineCommand::Seek { rate, flags, start_type, start, stop_type, stop });
        if self.reject_seek.load(Ordering::SeqCst) {
            return false;
        }
        {
            let mut inner = self.inner.lock().unwrap();
            // Forward playback resumes at the segment start, reverse at
            // the segment stop.
            if rate >= 0.0 {
                if start_type == SeekType::Set && start.is_some() {
                    inner.position = Some(start);
                }
            } else if stop_type == SeekType::Set && stop.is_some() {
                inner.position = Some(stop);
            }
        }
        if self.auto_async_done.load(Ordering::SeqCst) {
            self.push(EngineMessage::AsyncDone);
        }
        true
    }

    fn query_position(&self) -> Option<ClockTime> {
        self.inner.lock().unwrap().position
    }

    fn query_duration(&self) -> Option<ClockTime> {
        self.inner.lock().unwrap().duration
    }

    fn send_event(&self, event: StepEvent) -> bool {
        self.record(EngineCommand::Step(event));
        true
    }

    fn set_uri(&self, uri: &str) {
        self.record(EngineCommand::SetUri(uri.to_owned()));
    }

    fn set_volume(&self, volume: f64) {
        self.record(EngineCommand::SetVolume(volume));
    }

    fn configure_sink_format(&self, format: VideoFormat) -> Result<(), PlayerError> {
        self.record(EngineCommand::ConfigureSink(format));
        Ok(())
    }

    fn set_clock(&self, _clock: Arc<dyn SyncClock>) {
        self.record(EngineCommand::SetClock);
    }

    fn take_bus(&self) -> Option<mpsc::Receiver<EngineMessage>> {
        self.bus_rx.lock().unwrap().take()
    }
}

/// Buffer double that counts map/unmap calls for frame accounting.
pub(crate) struct MockBuffer {
    data: Bytes,
    pub maps: Arc<AtomicUsize>,
    pub unmaps: Arc<AtomicUsize>,
    pub fail_map: bool,
}

impl MockBuffer {
    pub fn new(data: Bytes) -> Self {
        MockBuffer {
            data,
            maps: Arc::new(AtomicUsize::new(0)),
            unmaps: Arc::new(AtomicUsize::new(0)),
            fail_map: false,
        }
    }
}

impl SampleBuffer for MockBuffer {
    fn map_read(&self) -> Result<MappedData, FrameError> {
        if self.fail_map {
            return Err(FrameError::Unmappable);
        }
        self.maps.fetch_add(1, Ordering::SeqCst);
        let unmaps = self.unmaps.clone();
        Ok(MappedData::new(self.data.clone(), move || {
            unmaps.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

/// Sink double fed from a queue of scripted samples.
pub(crate) struct MockSink {
    samples: Mutex<VecDeque<Sample>>,
}

impl MockSink {
    pub fn new() -> Arc<Self> {
        Arc::new(MockSink { samples: Mutex::new(VecDeque::new()) })
    }

    pub fn queue(&self, sample: Sample) {
        self.samples.lock().unwrap().push_back(sample);
    }

    pub fn queue_frame(&self, width: u32, height: u32, format: &str) -> Arc<MockBuffer> {
        let size = (width * height * 4) as usize;
        let buffer = Arc::new(MockBuffer::new(Bytes::from(vec![0u8; size])));
        self.queue(Sample {
            caps: SampleCaps { width, height, format: format.to_owned() },
            buffer: buffer.clone(),
        });
        buffer
    }
}

impl VideoSink for MockSink {
    fn pull_preroll(&self) -> Option<Sample> {
        self.samples.lock().unwrap().pop_front()
    }

    fn pull_sample(&self) -> Option<Sample> {
        self.samples.lock().unwrap().pop_front()
    }
}
