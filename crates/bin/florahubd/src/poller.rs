//! Periodic acquisition of every pairable device.
//!
//! The poller follows the registry: each newly recorded device whose local
//! name matches a profile gets its own task, acquiring a reading every
//! interval through the shared coordinator. A failed acquisition is logged
//! and the last good reading kept.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use florahub_app::coordinator::AcquisitionCoordinator;
use florahub_app::error::AcquireError;
use florahub_app::ports::TransportHandle;
use florahub_app::profiles::{self, DriverProfile, PairableDevice};
use florahub_app::registry::AdvertisementRegistry;
use florahub_domain::address::Address;
use florahub_domain::advertisement::Advertisement;
use florahub_domain::reading::SensorReading;
use florahub_domain::time::{self, Timestamp};

/// Spawns one polling task per pairable device.
pub struct Poller<H> {
    coordinator: AcquisitionCoordinator<H>,
    profiles: Arc<[DriverProfile]>,
    interval: Duration,
}

impl<H: TransportHandle> Poller<H> {
    pub fn new(
        coordinator: AcquisitionCoordinator<H>,
        profiles: Vec<DriverProfile>,
        interval: Duration,
    ) -> Self {
        Self {
            coordinator,
            profiles: profiles.into(),
            interval,
        }
    }

    /// Spawn the poller on the current runtime.
    ///
    /// Aborting the returned handle stops every device task.
    pub fn start(self, registry: Arc<AdvertisementRegistry<H>>) -> JoinHandle<()> {
        tracing::info!(interval_secs = self.interval.as_secs(), "poller started");
        tokio::spawn(self.run(registry))
    }

    async fn run(self, registry: Arc<AdvertisementRegistry<H>>) {
        let mut notifications = registry.subscribe();
        let mut polled = HashSet::new();
        let mut tasks = JoinSet::new();

        self.catch_up(&registry, &mut polled, &mut tasks);

        loop {
            match notifications.recv().await {
                Ok(advertisement) => {
                    if let Some(device) = self.pairable(&advertisement) {
                        self.track(device, &mut polled, &mut tasks);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "poller lagged behind registry");
                    self.catch_up(&registry, &mut polled, &mut tasks);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    fn catch_up(
        &self,
        registry: &AdvertisementRegistry<H>,
        polled: &mut HashSet<Address>,
        tasks: &mut JoinSet<()>,
    ) {
        let devices = profiles::pairable_devices(registry, &self.profiles);
        tracing::debug!(count = devices.len(), "pairable devices");
        for device in devices {
            self.track(device, polled, tasks);
        }
    }

    fn pairable(&self, advertisement: &Advertisement<H>) -> Option<PairableDevice> {
        profiles::find(&self.profiles, &advertisement.local_name).map(|profile| PairableDevice {
            name: profile.visible_name.clone(),
            address: advertisement.address.clone(),
        })
    }

    /// Start polling `device` unless it already is.
    fn track(
        &self,
        device: PairableDevice,
        polled: &mut HashSet<Address>,
        tasks: &mut JoinSet<()>,
    ) {
        if !polled.insert(device.address.clone()) {
            return;
        }
        tracing::info!(name = %device.name, address = %device.address, "polling device");
        tasks.spawn(poll_device(self.coordinator.clone(), device, self.interval));
    }
}

/// The most recent successful reading of a device.
#[derive(Debug, Clone)]
struct LastReading {
    reading: SensorReading,
    at: Timestamp,
}

async fn poll_device<H: TransportHandle>(
    coordinator: AcquisitionCoordinator<H>,
    device: PairableDevice,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = None;

    loop {
        ticker.tick().await;
        let outcome = coordinator.acquire(&device.address).await;
        last = remember(&device, last, outcome);
    }
}

/// Log an acquisition outcome and return the reading to keep.
fn remember(
    device: &PairableDevice,
    last: Option<LastReading>,
    outcome: Result<SensorReading, AcquireError>,
) -> Option<LastReading> {
    match outcome {
        Ok(reading) => {
            match serde_json::to_string(&reading) {
                Ok(json) => tracing::info!(
                    name = %device.name,
                    address = %device.address,
                    reading = %json,
                    "reading acquired"
                ),
                Err(err) => tracing::warn!(%err, "failed to serialize reading"),
            }
            Some(LastReading {
                reading,
                at: time::now(),
            })
        }
        Err(err) => {
            match &last {
                Some(previous) => tracing::warn!(
                    name = %device.name,
                    %err,
                    last_temperature = previous.reading.temperature,
                    last_reading_at = %previous.at,
                    "acquisition failed, keeping last reading"
                ),
                None => tracing::warn!(name = %device.name, %err, "acquisition failed"),
            }
            last
        }
    }
}
