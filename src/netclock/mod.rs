//! Network clock synchronization
//!
//! Establishes a shared wall-clock across machines, either by
//! publishing a reference clock ([`ServerClock`]) or by tracking a
//! remote one ([`ClientClock`]). The resulting [`SyncClock`] is bound
//! to the engine's timing source for frame-accurate multi-process
//! presentation.
//!
//! The wire protocol itself lives behind [`NetClockFactory`]; this
//! module only owns the binding lifecycle: one active binding per
//! instance, rebuilt (old disposed first) whenever address, port,
//! source clock or base offset changes, reused otherwise.

pub mod client;
pub mod server;

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::engine::ClockTime;
use crate::error::ClockError;

pub use client::ClientClock;
pub use server::ServerClock;

/// A monotonic shared clock consumable by the engine.
pub trait SyncClock: Send + Sync {
    /// Current time on this clock's timeline.
    fn now(&self) -> ClockTime;
}

/// Default system clock over a process-wide monotonic base.
pub struct SystemClock {
    base: Instant,
}

impl SystemClock {
    /// The process-wide system clock instance.
    pub fn obtain() -> Arc<SystemClock> {
        static INSTANCE: OnceLock<Arc<SystemClock>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| Arc::new(SystemClock { base: Instant::now() }))
            .clone()
    }
}

impl SyncClock for SystemClock {
    fn now(&self) -> ClockTime {
        ClockTime::from_nanos(self.base.elapsed().as_nanos() as u64)
    }
}

/// An active server-side binding publishing a clock over the network.
///
/// Dropping the provider disposes the binding.
pub trait TimeProvider: Send + Sync {
    /// The clock being published.
    fn clock(&self) -> Arc<dyn SyncClock>;

    /// Bind address, empty when listening on all interfaces.
    fn address(&self) -> &str;

    fn port(&self) -> u16;
}

/// Constructs the wire-level clock objects.
///
/// Construction failures are fatal for the call; there is no retry
/// logic, the caller re-invokes its `update` to try again.
pub trait NetClockFactory: Send + Sync {
    /// Publish `clock` at `address:port`. `None` address listens on all
    /// interfaces.
    fn new_time_provider(
        &self,
        clock: Arc<dyn SyncClock>,
        address: Option<&str>,
        port: u16,
    ) -> Result<Box<dyn TimeProvider>, ClockError>;

    /// Build a proxy clock tracking the server at `address:port`,
    /// shifted by a fixed `base_time` offset.
    fn new_client_clock(
        &self,
        address: &str,
        port: u16,
        base_time: ClockTime,
    ) -> Result<Arc<dyn SyncClock>, ClockError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::obtain();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_system_clock_is_shared() {
        let a = SystemClock::obtain();
        let b = SystemClock::obtain();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
