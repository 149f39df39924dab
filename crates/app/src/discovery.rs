//! Discovery loop — periodically scans and feeds the advertisement registry.
//!
//! A scan runs once eagerly at start, then every interval. A failed scan is
//! logged and the loop carries on with the next interval; discovery errors
//! never reach any caller.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error::TransportError;
use crate::ports::Transport;
use crate::registry::AdvertisementRegistry;

/// Default period between two scans.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Scans through a [`Transport`] and records allowed devices.
pub struct DiscoveryLoop<T: Transport> {
    transport: T,
    registry: Arc<AdvertisementRegistry<T::Handle>>,
    interval: Duration,
}

impl<T: Transport> DiscoveryLoop<T> {
    /// Create a discovery loop recording into `registry`.
    pub fn new(
        transport: T,
        registry: Arc<AdvertisementRegistry<T::Handle>>,
        interval: Duration,
    ) -> Self {
        Self {
            transport,
            registry,
            interval,
        }
    }

    /// Spawn the loop on the current runtime.
    pub fn start(self) -> JoinHandle<()> {
        tracing::info!(interval_secs = self.interval.as_secs(), "discovery loop started");
        tokio::spawn(self.run())
    }

    /// Continuous scan loop — runs a scan, waits for the interval, repeats.
    async fn run(self) {
        loop {
            if let Err(err) = self.iterate().await {
                tracing::warn!(%err, "discovery scan failed, retrying next interval");
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Run a single scan and record every allowed, previously unseen device.
    ///
    /// Returns the number of devices recorded.
    ///
    /// # Errors
    ///
    /// Returns the [`TransportError`] of the discovery primitive.
    pub async fn iterate(&self) -> Result<usize, TransportError> {
        tracing::debug!("scanning for devices");
        let advertisements = self.transport.discover().await?;

        if advertisements.is_empty() {
            tracing::debug!("found no devices");
        }

        let mut recorded = 0;
        for advertisement in advertisements {
            if !self.registry.is_allowed(&advertisement.local_name) {
                tracing::trace!(
                    address = %advertisement.address,
                    name = %advertisement.local_name,
                    "ignoring device not in allow-list"
                );
                continue;
            }
            let address = advertisement.address.clone();
            let name = advertisement.local_name.clone();
            if self.registry.record(advertisement) {
                tracing::info!(%address, %name, "found a device");
                recorded += 1;
            }
        }
        Ok(recorded)
    }
}
