//! Playback control
//!
//! [`PlaybackController`] is the crate's main entry point: it owns one
//! engine instance and applies per-tick [`UpdateParams`] to it, handling
//! state transitions, seeks and segment looping.

pub mod controller;
pub mod seek;
pub mod session;

pub use controller::PlaybackController;
pub use seek::SeekRequest;
pub use session::{PlaybackStatus, SharedStatus, UpdateParams};
