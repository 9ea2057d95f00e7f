//! Typed bus messages emitted by the engine
//!
//! The engine delivers asynchronous notifications on its own worker
//! threads. Rather than letting those threads mutate controller state
//! directly, every notification is translated into one of these variants
//! and pushed onto a bounded channel that the control thread drains on
//! each update tick.

use super::time::ClockTime;
use super::traits::EngineState;

/// Capacity of the engine bus channel.
///
/// Bus traffic is low-rate (state changes, segment boundaries, errors),
/// so a small bound is enough; an engine that overruns it is stalled far
/// beyond what a lost warning message would matter for.
pub const BUS_CAPACITY: usize = 64;

/// One asynchronous engine notification.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// The engine committed a state transition.
    StateChanged {
        old: EngineState,
        new: EngineState,
    },

    /// A segment-mode seek reached its boundary. Carries the stream
    /// position at which the boundary was hit.
    SegmentDone { position: ClockTime },

    /// The media duration changed (or became known); cached values must
    /// be re-queried.
    DurationChanged,

    /// An asynchronous operation (seek, async state change) completed.
    AsyncDone,

    /// End of stream.
    Eos,

    /// The engine reported a non-fatal error. Playback continues.
    Error { source: String, message: String },

    /// The engine reported a warning.
    Warning { source: String, message: String },
}
