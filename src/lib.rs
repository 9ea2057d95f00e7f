//! playcast: playback control for a playbin-style media engine.
//!
//! The crate drives an external decode/render engine through a per-tick
//! update loop: the application states its full intent every tick
//! ([`player::UpdateParams`]) and the [`player::PlaybackController`]
//! diffs it against the running session, issuing the minimal engine
//! commands. On top of that it provides segment looping in both
//! directions, zero-copy frame extraction ([`frame::FrameSource`]) and
//! network clock distribution ([`netclock::ServerClock`],
//! [`netclock::ClientClock`]).
//!
//! The engine itself is behind the [`engine::Engine`] trait; a binding
//! adapts the native handle, tests use scripted doubles.

pub mod engine;
pub mod error;
pub mod format;
pub mod frame;
pub mod netclock;
pub mod player;

pub use engine::{ClockTime, Engine, EngineState, VideoSink};
pub use error::{EngineIncident, FrameError, IncidentSeverity, PlayerError};
pub use format::PixelFormat;
pub use frame::{DeliveryMode, Frame, FrameSource, SharedFrames};
pub use player::{PlaybackController, PlaybackStatus, UpdateParams};
