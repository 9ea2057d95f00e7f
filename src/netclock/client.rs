//! Network time client role
//!
//! Derives a local proxy clock from a remote time server, shifted by a
//! fixed base-time offset.

use std::sync::Arc;

use log::info;

use super::{NetClockFactory, SyncClock};
use crate::engine::ClockTime;
use crate::error::ClockError;

/// Tracks a remote clock server at `address:port`.
///
/// Same rebuild discipline as the server role: the proxy is rebuilt
/// only when address, port or base time change, the old binding is
/// disposed before the new one is created, and at most one binding is
/// active per instance.
pub struct ClientClock {
    factory: Arc<dyn NetClockFactory>,
    clock: Option<Arc<dyn SyncClock>>,
    address: String,
    port: u16,
    base_time: ClockTime,
}

impl ClientClock {
    pub fn new(factory: Arc<dyn NetClockFactory>) -> Self {
        ClientClock {
            factory,
            clock: None,
            address: String::new(),
            port: 0,
            base_time: ClockTime::ZERO,
        }
    }

    /// Track the server at `address:port` with a fixed offset of
    /// `base_time` seconds, returning the proxy clock.
    pub fn update(
        &mut self,
        address: &str,
        port: u16,
        base_time: f64,
    ) -> Result<Arc<dyn SyncClock>, ClockError> {
        let base_time = ClockTime::from_seconds(base_time);
        if let Some(clock) = &self.clock {
            if self.address == address && self.port == port && self.base_time == base_time {
                return Ok(clock.clone());
            }
        }

        // Dispose the previous proxy before connecting the new one.
        self.clock = None;
        self.address = address.to_owned();
        self.port = port;
        self.base_time = base_time;

        let clock = self.factory.new_client_clock(address, port, base_time)?;
        info!("clock client tracking {address}:{port} (base {base_time})");
        self.clock = Some(clock.clone());
        Ok(clock)
    }

    /// The active proxy clock, if any.
    pub fn clock(&self) -> Option<Arc<dyn SyncClock>> {
        self.clock.clone()
    }
}
