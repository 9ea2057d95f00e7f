//! Seek request construction
//!
//! A seek's start/stop bounds are derived from the playback direction:
//! forward seeks anchor the start at the requested time and close the
//! segment at the loop end; backward seeks anchor the stop at the
//! requested time and open the segment at the loop start. Looping adds
//! the segment flag so the engine reports the boundary instead of
//! terminating the stream.

use crate::engine::{ClockTime, SeekFlags, SeekType};

/// One fully-specified seek call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRequest {
    pub rate: f64,
    pub flags: SeekFlags,
    pub start_type: SeekType,
    pub start: ClockTime,
    pub stop_type: SeekType,
    pub stop: ClockTime,
}

/// Build an explicit seek to `seek_time` under the given loop window.
///
/// Explicit seeks always flush and are accurate; the segment flag
/// follows `looping`. Without looping the request is open-ended in the
/// direction of travel.
pub(crate) fn build_seek(
    rate: f64,
    seek_time: f64,
    looping: bool,
    loop_start: f64,
    loop_end: Option<f64>,
) -> SeekRequest {
    let flags = SeekFlags::flush_accurate().with_segment(looping);
    if rate >= 0.0 {
        let start = seek_time.max(0.0);
        let stop = match loop_end {
            Some(end) if looping && start <= end => ClockTime::from_seconds(end),
            _ => ClockTime::NONE,
        };
        SeekRequest {
            rate,
            flags,
            start_type: SeekType::Set,
            start: ClockTime::from_seconds(start),
            stop_type: SeekType::Set,
            stop,
        }
    } else {
        let stop = seek_time.max(0.0);
        let start = if looping && stop >= loop_start {
            ClockTime::from_seconds(loop_start)
        } else {
            ClockTime::ZERO
        };
        SeekRequest {
            rate,
            flags,
            start_type: SeekType::Set,
            start,
            stop_type: SeekType::Set,
            stop: ClockTime::from_seconds(stop),
        }
    }
}

/// Build the segment-boundary re-seek back into the loop window.
///
/// The window bounds are direction-independent; the engine resumes at
/// the start for forward rates and at the stop for backward rates.
/// No flush here: the caller adds it for the EOS path (or when the
/// engine is not playing).
pub(crate) fn loop_seek(rate: f64, loop_start: f64, loop_end: Option<f64>) -> SeekRequest {
    SeekRequest {
        rate,
        flags: SeekFlags::accurate().with_segment(true),
        start_type: SeekType::Set,
        start: ClockTime::from_seconds(loop_start),
        stop_type: SeekType::Set,
        stop: loop_end.map_or(ClockTime::NONE, ClockTime::from_seconds),
    }
}

/// Build the in-place segment extension used when the far boundary
/// moved outward mid-segment: only the far edge changes, the near edge
/// and current position are left alone, avoiding a visible skip.
pub(crate) fn extend_segment(rate: f64, loop_start: f64, loop_end: Option<f64>) -> SeekRequest {
    let flags = SeekFlags::accurate().with_segment(true);
    if rate >= 0.0 {
        SeekRequest {
            rate,
            flags,
            start_type: SeekType::NoChange,
            start: ClockTime::NONE,
            stop_type: SeekType::Set,
            stop: loop_end.map_or(ClockTime::NONE, ClockTime::from_seconds),
        }
    } else {
        SeekRequest {
            rate,
            flags,
            start_type: SeekType::Set,
            start: ClockTime::from_seconds(loop_start),
            stop_type: SeekType::NoChange,
            stop: ClockTime::NONE,
        }
    }
}
