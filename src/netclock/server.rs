//! Network time server role
//!
//! Publishes a reference clock over the network so that client machines
//! can derive a synchronized local proxy from it.

use std::sync::Arc;

use log::info;

use super::{NetClockFactory, SyncClock, SystemClock, TimeProvider};
use crate::error::ClockError;

/// Publishes a source clock at `address:port`.
///
/// `update` is idempotent: the provider is rebuilt only when the source
/// clock, address or port differ from the last call, and the previous
/// binding is disposed before the new one is created. At most one
/// binding is active per instance.
pub struct ServerClock {
    factory: Arc<dyn NetClockFactory>,
    provider: Option<Box<dyn TimeProvider>>,
    source: Option<Arc<dyn SyncClock>>,
    address: Option<String>,
    port: u16,
}

impl ServerClock {
    pub fn new(factory: Arc<dyn NetClockFactory>) -> Self {
        ServerClock {
            factory,
            provider: None,
            source: None,
            address: None,
            port: 0,
        }
    }

    /// Publish `source` (the system clock when `None`) at
    /// `address:port` and return the shared clock.
    pub fn update(
        &mut self,
        source: Option<Arc<dyn SyncClock>>,
        address: Option<&str>,
        port: u16,
    ) -> Result<Arc<dyn SyncClock>, ClockError> {
        let source_changed = match (&self.source, &source) {
            (None, None) => false,
            (Some(old), Some(new)) => !Arc::ptr_eq(old, new),
            _ => true,
        };
        let unchanged = self.provider.is_some()
            && !source_changed
            && self.address.as_deref() == address
            && self.port == port;

        if unchanged {
            if let Some(provider) = &self.provider {
                return Ok(provider.clock());
            }
        }

        // Dispose the previous binding before building its replacement.
        self.provider = None;
        self.source = source.clone();
        self.address = address.map(str::to_owned);
        self.port = port;

        let published: Arc<dyn SyncClock> = match source {
            Some(clock) => clock,
            None => SystemClock::obtain(),
        };
        let provider = self.factory.new_time_provider(published, address, port)?;
        info!(
            "clock server publishing at {}:{}",
            if provider.address().is_empty() { "*" } else { provider.address() },
            provider.port()
        );
        let shared = provider.clock();
        self.provider = Some(provider);
        Ok(shared)
    }

    /// Bind address of the active provider.
    pub fn address(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.address())
    }

    /// Bind port of the active provider.
    pub fn port(&self) -> Option<u16> {
        self.provider.as_ref().map(|p| p.port())
    }

    /// The clock currently being published.
    pub fn clock(&self) -> Option<Arc<dyn SyncClock>> {
        self.provider.as_ref().map(|p| p.clock())
    }
}
