//! Decoded frame delivery
//!
//! Wraps samples pulled from the video sink into [`Frame`] descriptors
//! with scoped, zero-copy access to the decoded pixels, and pumps them
//! to consumers independently of the playback controller's tick.

pub mod frame;
pub mod source;

pub use frame::Frame;
pub use source::{DeliveryMode, FrameSource, SharedFrames, SinkSignal, signal_channel};
