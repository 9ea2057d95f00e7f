//! Error taxonomy
//!
//! Construction-time and state-transition failures are raised
//! synchronously to the caller. Errors the engine reports from its own
//! threads arrive as bus messages and are surfaced as
//! [`EngineIncident`] records through the log channel and the
//! controller's `last_incident` accessor; they never panic the polling
//! loop.

use thiserror::Error;

use crate::engine::EngineState;
use crate::format::PixelFormat;

/// Fatal and recoverable failures of the playback controller.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// A required engine element could not be created; no playback is
    /// possible.
    #[error("required engine element could not be created: {0}")]
    ElementCreation(String),

    /// The engine refused a state transition. Fatal for that call, no
    /// retry is attempted.
    #[error("engine refused state transition to {requested}")]
    StateChange { requested: EngineState },

    /// A seek was rejected or timed out. Recoverable: the in-flight
    /// flag is cleared and the caller may retry on the next tick.
    #[error("seek to {target:.3}s rejected by engine")]
    Seek { target: f64 },

    /// The requested pixel format has no engine mapping. Raised before
    /// the engine is asked to negotiate.
    #[error("unsupported pixel format {0:?}")]
    UnsupportedFormat(PixelFormat),

    /// Clock binding construction failed.
    #[error(transparent)]
    Clock(#[from] ClockError),
}

/// Per-frame failures during sample extraction. Playback continues for
/// subsequent frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The sample buffer could not be mapped for reading.
    #[error("sample buffer could not be mapped for reading")]
    Unmappable,

    /// The negotiated format name has no pixel-format mapping.
    #[error("no pixel format mapping for negotiated format {0:?}")]
    UnsupportedFormat(String),
}

/// Network clock binding failures. Fatal for the construction; the
/// caller re-invokes `update` to retry.
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("failed to build {role} clock binding at {address}:{port}: {reason}")]
    Construction {
        role: &'static str,
        address: String,
        port: u16,
        reason: String,
    },
}

/// Severity of an engine-reported incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentSeverity {
    Error,
    Warning,
}

/// A non-fatal error or warning the engine reported asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineIncident {
    pub severity: IncidentSeverity,
    /// Name of the element that reported the incident.
    pub source: String,
    pub message: String,
}

impl std::fmt::Display for EngineIncident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            IncidentSeverity::Error => "error",
            IncidentSeverity::Warning => "warning",
        };
        write!(f, "engine {severity} from {}: {}", self.source, self.message)
    }
}
