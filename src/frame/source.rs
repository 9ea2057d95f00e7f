//! Frame extraction from the video sink
//!
//! The sink raises two trigger events: preroll (first frame available
//! before playback starts) and new-sample (steady-state delivery).
//! Both funnel into one extraction path here: pull the pending sample
//! and, if non-null, construct a [`Frame`].
//!
//! Two delivery models are supported:
//! - **push-and-dispose**: the frame is only valid inside the consumer
//!   callback; its mapping is released as soon as the callback returns.
//! - **shared-until-superseded**: the latest frame is held in a shared
//!   slot and handed out as a refcounted handle; the slot reference is
//!   replaced by the next sample and cleared on EOS, so the slot's
//!   lifetime is pinned to "next event", not to any single consumer.

use std::sync::{Arc, Mutex};

use log::{debug, error};
use tokio::sync::mpsc;

use super::frame::Frame;
use crate::engine::VideoSink;
use crate::error::FrameError;

/// Capacity of the sink signal channel. Signals are edge triggers, not
/// data; the sink holds at most one pending sample anyway.
pub const SIGNAL_CAPACITY: usize = 8;

/// Sink trigger events feeding the extraction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkSignal {
    /// A preroll sample is waiting.
    Preroll,
    /// A steady-state sample is waiting.
    Sample,
    /// End of stream: no further samples; shared frames are superseded.
    Eos,
}

/// Create the bounded channel connecting sink callbacks to a
/// [`FrameSource`]. The sender side belongs to the engine binding.
pub fn signal_channel() -> (mpsc::Sender<SinkSignal>, mpsc::Receiver<SinkSignal>) {
    mpsc::channel(SIGNAL_CAPACITY)
}

/// How extracted frames reach their consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Deliver through the callback, unmap when it returns.
    PushAndDispose,
    /// Publish into the shared slot for [`SharedFrames::latest`].
    SharedUntilSuperseded,
}

/// Cloneable consumer handle for shared-until-superseded delivery.
#[derive(Clone)]
pub struct SharedFrames {
    slot: Arc<Mutex<Option<Arc<Frame>>>>,
}

impl SharedFrames {
    /// The most recent frame, if one is current. The handle stays
    /// valid for as long as the caller holds it, but the slot stops
    /// handing it out once it is superseded.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.slot.lock().unwrap().clone()
    }
}

/// Pulls decoded samples from the sink on signal arrival and delivers
/// them as frames.
pub struct FrameSource {
    sink: Arc<dyn VideoSink>,
    signals: mpsc::Receiver<SinkSignal>,
    mode: DeliveryMode,
    callback: Option<Box<dyn FnMut(&Frame) + Send>>,
    slot: Arc<Mutex<Option<Arc<Frame>>>>,
    frames_delivered: u64,
}

impl FrameSource {
    pub fn new(
        sink: Arc<dyn VideoSink>,
        signals: mpsc::Receiver<SinkSignal>,
        mode: DeliveryMode,
    ) -> Self {
        FrameSource {
            sink,
            signals,
            mode,
            callback: None,
            slot: Arc::new(Mutex::new(None)),
            frames_delivered: 0,
        }
    }

    /// Install the consumer callback for push-and-dispose delivery.
    pub fn set_callback(&mut self, callback: impl FnMut(&Frame) + Send + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Consumer handle for shared-until-superseded delivery.
    pub fn shared(&self) -> SharedFrames {
        SharedFrames { slot: self.slot.clone() }
    }

    /// Number of frames constructed and delivered so far.
    pub fn frames_delivered(&self) -> u64 {
        self.frames_delivered
    }

    /// Process one sink signal.
    ///
    /// A null sample (spurious signal) is a no-op. An unmappable buffer
    /// or unknown format is a per-frame error; subsequent signals keep
    /// working. Returns whether a frame was delivered.
    pub fn handle_signal(&mut self, signal: SinkSignal) -> Result<bool, FrameError> {
        let sample = match signal {
            SinkSignal::Preroll => self.sink.pull_preroll(),
            SinkSignal::Sample => self.sink.pull_sample(),
            SinkSignal::Eos => {
                // Supersede: holders of the previous frame keep it
                // alive, the slot stops handing it out.
                self.slot.lock().unwrap().take();
                debug!("frame source reached end of stream");
                return Ok(false);
            }
        };
        let Some(sample) = sample else {
            return Ok(false);
        };

        match self.mode {
            DeliveryMode::PushAndDispose => {
                let frame = Frame::from_sample(&sample)?;
                self.frames_delivered += 1;
                if let Some(callback) = &mut self.callback {
                    callback(&frame);
                }
                // frame drops here, releasing the mapping
            }
            DeliveryMode::SharedUntilSuperseded => {
                let frame = Arc::new(Frame::from_sample(&sample)?);
                self.frames_delivered += 1;
                *self.slot.lock().unwrap() = Some(frame);
            }
        }
        Ok(true)
    }

    /// Drain the signal channel until the engine binding drops its
    /// sender. Per-frame errors are reported and skipped.
    pub async fn run(&mut self) {
        while let Some(signal) = self.signals.recv().await {
            if let Err(e) = self.handle_signal(signal) {
                error!("frame extraction failed: {e}");
            }
        }
        debug!("sink signal channel closed, frame source stopping");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::engine::mock::MockSink;
    use crate::format::PixelFormat;

    #[test]
    fn test_preroll_and_sample_funnel_together() {
        let sink = MockSink::new();
        let (_tx, rx) = signal_channel();
        let mut source = FrameSource::new(sink.clone(), rx, DeliveryMode::PushAndDispose);

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        source.set_callback(move |frame| {
            assert_eq!(frame.pixel_format(), PixelFormat::B8G8R8A8);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sink.queue_frame(64, 48, "BGRA");
        assert!(source.handle_signal(SinkSignal::Preroll).unwrap());
        sink.queue_frame(64, 48, "BGRA");
        assert!(source.handle_signal(SinkSignal::Sample).unwrap());

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(source.frames_delivered(), 2);
    }

    #[test]
    fn test_null_sample_is_noop() {
        let sink = MockSink::new();
        let (_tx, rx) = signal_channel();
        let mut source = FrameSource::new(sink, rx, DeliveryMode::PushAndDispose);

        assert!(!source.handle_signal(SinkSignal::Sample).unwrap());
        assert_eq!(source.frames_delivered(), 0);
    }

    #[test]
    fn test_push_and_dispose_unmaps_after_callback() {
        let sink = MockSink::new();
        let (_tx, rx) = signal_channel();
        let mut source = FrameSource::new(sink.clone(), rx, DeliveryMode::PushAndDispose);
        source.set_callback(|_frame| {});

        let buffer = sink.queue_frame(32, 32, "RGBA");
        source.handle_signal(SinkSignal::Sample).unwrap();

        assert_eq!(buffer.maps.load(Ordering::SeqCst), 1);
        assert_eq!(buffer.unmaps.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shared_frame_superseded_by_next_sample() {
        let sink = MockSink::new();
        let (_tx, rx) = signal_channel();
        let mut source = FrameSource::new(sink.clone(), rx, DeliveryMode::SharedUntilSuperseded);
        let shared = source.shared();

        let first_buffer = sink.queue_frame(32, 32, "RGBA");
        source.handle_signal(SinkSignal::Sample).unwrap();
        let held = shared.latest().unwrap();

        sink.queue_frame(32, 32, "RGBA");
        source.handle_signal(SinkSignal::Sample).unwrap();

        // The straggler's handle keeps the old mapping alive
        assert_eq!(first_buffer.unmaps.load(Ordering::SeqCst), 0);
        drop(held);
        assert_eq!(first_buffer.unmaps.load(Ordering::SeqCst), 1);

        // The slot now serves the new frame only
        assert!(shared.latest().is_some());
    }

    #[test]
    fn test_eos_clears_shared_slot() {
        let sink = MockSink::new();
        let (_tx, rx) = signal_channel();
        let mut source = FrameSource::new(sink.clone(), rx, DeliveryMode::SharedUntilSuperseded);
        let shared = source.shared();

        let buffer = sink.queue_frame(16, 16, "RGBA");
        source.handle_signal(SinkSignal::Sample).unwrap();
        assert!(shared.latest().is_some());

        source.handle_signal(SinkSignal::Eos).unwrap();
        assert!(shared.latest().is_none());
        assert_eq!(buffer.unmaps.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_frame_accounting_across_models() {
        for mode in [DeliveryMode::PushAndDispose, DeliveryMode::SharedUntilSuperseded] {
            let sink = MockSink::new();
            let (_tx, rx) = signal_channel();
            let mut source = FrameSource::new(sink.clone(), rx, mode);

            let buffers: Vec<_> = (0..5).map(|_| sink.queue_frame(8, 8, "BGRA")).collect();
            for _ in 0..5 {
                source.handle_signal(SinkSignal::Sample).unwrap();
            }
            source.handle_signal(SinkSignal::Eos).unwrap();

            assert_eq!(source.frames_delivered(), 5);
            for buffer in &buffers {
                assert_eq!(buffer.maps.load(Ordering::SeqCst), 1, "{mode:?}");
                assert_eq!(buffer.unmaps.load(Ordering::SeqCst), 1, "{mode:?}");
            }
        }
    }

    #[test]
    fn test_unmappable_buffer_is_fatal_per_frame_only() {
        let sink = MockSink::new();
        let (_tx, rx) = signal_channel();
        let mut source = FrameSource::new(sink.clone(), rx, DeliveryMode::PushAndDispose);

        let mut bad = crate::engine::mock::MockBuffer::new(bytes::Bytes::new());
        bad.fail_map = true;
        sink.queue(crate::engine::Sample {
            caps: crate::engine::SampleCaps { width: 8, height: 8, format: "RGBA".into() },
            buffer: Arc::new(bad),
        });
        assert!(source.handle_signal(SinkSignal::Sample).is_err());

        // Playback continues for subsequent frames
        sink.queue_frame(8, 8, "RGBA");
        assert!(source.handle_signal(SinkSignal::Sample).unwrap());
    }

    #[test]
    fn test_run_drains_until_channel_closes() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let sink = MockSink::new();
            let (tx, rx) = signal_channel();
            let mut source = FrameSource::new(sink.clone(), rx, DeliveryMode::SharedUntilSuperseded);
            let shared = source.shared();

            sink.queue_frame(8, 8, "BGRA");
            tx.send(SinkSignal::Sample).await.unwrap();
            drop(tx);

            source.run().await;
            assert_eq!(source.frames_delivered(), 1);
            assert!(shared.latest().is_some());
        });
    }
}
