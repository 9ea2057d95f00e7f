//! Abstraction layer over the native decode/render engine
//!
//! This crate drives a playbin-style media engine but does not
//! implement one. The module defines the seam:
//! - [`Engine`]: state transitions, seeks, queries, events
//! - [`VideoSink`]/[`SampleBuffer`]: decoded sample extraction with
//!   scoped zero-copy memory access
//! - [`EngineMessage`]: the asynchronous bus, delivered over a bounded
//!   channel so engine worker threads never touch controller state
//! - [`ClockTime`]: the nanosecond time base shared with the engine

pub mod message;
pub mod sample;
pub mod time;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use message::{BUS_CAPACITY, EngineMessage};
pub use sample::{MappedData, Sample, SampleBuffer, SampleCaps, VideoSink};
pub use time::{ClockTime, SECOND};
pub use traits::{
    Engine, EngineState, SeekFlags, SeekType, StateChange, StepEvent, set_state_blocking,
};
