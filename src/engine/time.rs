//! Engine time representation
//!
//! All times at the public API boundary are floating-point seconds; the
//! engine itself works in fixed-point nanoseconds. `ClockTime` is the
//! nanosecond side of that conversion, with an explicit `NONE` sentinel
//! for "no value" (unknown duration, open-ended seek stop, infinite
//! state-change timeout).

/// Nanoseconds per second in engine units.
pub const SECOND: u64 = 1_000_000_000;

/// A point or span on the engine timeline, in nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u64);

impl ClockTime {
    /// Sentinel for "no time value".
    pub const NONE: ClockTime = ClockTime(u64::MAX);

    /// Zero on the engine timeline.
    pub const ZERO: ClockTime = ClockTime(0);

    /// Create a time from raw nanoseconds.
    pub fn from_nanos(nanos: u64) -> Self {
        ClockTime(nanos)
    }

    /// Convert seconds at the API boundary to engine nanoseconds.
    ///
    /// Negative and non-finite inputs clamp to zero; values beyond the
    /// nanosecond range clamp just below the [`ClockTime::NONE`]
    /// sentinel so a real time never reads as "no value". Callers that
    /// want "no value" use `NONE` explicitly.
    pub fn from_seconds(seconds: f64) -> Self {
        if !seconds.is_finite() || seconds <= 0.0 {
            return ClockTime::ZERO;
        }
        // The float-to-int cast saturates at u64::MAX, which is the
        // NONE sentinel.
        ClockTime(((seconds * SECOND as f64) as u64).min(u64::MAX - 1))
    }

    /// Raw nanosecond value. `NONE` reads as `u64::MAX`.
    pub fn nanos(self) -> u64 {
        self.0
    }

    /// Whether this is the `NONE` sentinel.
    pub fn is_none(self) -> bool {
        self.0 == u64::MAX
    }

    /// Whether this carries an actual time value.
    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Convert to seconds for the API boundary. `NONE` becomes `-1.0`,
    /// the "unknown" convention of the update contract.
    pub fn as_seconds(self) -> f64 {
        if self.is_none() {
            -1.0
        } else {
            self.0 as f64 / SECOND as f64
        }
    }
}

impl std::fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "ClockTime::NONE")
        } else {
            write!(f, "ClockTime({}ns)", self.0)
        }
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "none")
        } else {
            write!(f, "{:.3}s", self.as_seconds())
        }
    }
}
