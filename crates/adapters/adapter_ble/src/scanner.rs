//! BLE scanner — discovers broadcasting peripherals for the discovery loop.
//!
//! [`BleTransport`] owns the host's first BLE adapter. Each discovery call
//! listens for advertisements for the configured duration, then resolves
//! every peripheral seen into an address, a local name and a handle.

use std::collections::HashSet;
use std::fmt::Display;
use std::time::Duration;

use btleplug::api::{BDAddr, Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager};
use tokio_stream::StreamExt as _;

use florahub_app::error::TransportError;
use florahub_app::ports::Transport;
use florahub_domain::address::Address;
use florahub_domain::advertisement::Advertisement;

use crate::config::BleConfig;
use crate::error::BleError;
use crate::gatt::BlePeripheral;

/// Transport backed by the host's first BLE adapter.
pub struct BleTransport {
    adapter: Adapter,
    scan_duration: Duration,
    operation_timeout: Duration,
}

impl BleTransport {
    /// Open the first BLE adapter of the host.
    ///
    /// # Errors
    ///
    /// Returns [`BleError::NotAvailable`] when the host has no adapter, or
    /// [`BleError::Btle`] when the BLE stack cannot be reached.
    pub async fn open(config: &BleConfig) -> Result<Self, BleError> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        let adapter = adapters.into_iter().next().ok_or(BleError::NotAvailable)?;

        match adapter.adapter_info().await {
            Ok(info) => tracing::info!(%info, "BLE adapter opened"),
            Err(err) => tracing::debug!(%err, "BLE adapter opened, no adapter info"),
        }

        Ok(Self {
            adapter,
            scan_duration: config.scan_duration(),
            operation_timeout: config.operation_timeout(),
        })
    }

    /// Run a single BLE scan for the configured duration.
    async fn scan(&self) -> Result<Vec<Advertisement<BlePeripheral>>, BleError> {
        let mut events = self.adapter.events().await?;
        self.adapter.start_scan(ScanFilter::default()).await?;

        let mut seen = HashSet::new();
        let deadline = tokio::time::Instant::now() + self.scan_duration;

        while tokio::time::Instant::now() < deadline {
            let remaining = deadline - tokio::time::Instant::now();
            match tokio::time::timeout(remaining, events.next()).await {
                Ok(Some(CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id))) => {
                    seen.insert(id);
                }
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            }
        }

        self.adapter.stop_scan().await?;

        let mut advertisements = Vec::with_capacity(seen.len());
        for id in seen {
            let Ok(peripheral) = self.adapter.peripheral(&id).await else {
                continue;
            };
            let Ok(Some(props)) = peripheral.properties().await else {
                continue;
            };
            let Some(local_name) = props.local_name else {
                tracing::trace!(%id, "skipping peripheral without local name");
                continue;
            };
            let Some(address) = resolve_address(props.address, &id) else {
                tracing::debug!(%id, "skipping peripheral without usable address");
                continue;
            };
            tracing::trace!(%address, name = %local_name, rssi = ?props.rssi, "BLE device detected");
            advertisements.push(Advertisement::new(
                address,
                local_name,
                BlePeripheral::new(peripheral, self.operation_timeout),
            ));
        }

        Ok(advertisements)
    }
}

impl Transport for BleTransport {
    type Handle = BlePeripheral;

    async fn discover(&self) -> Result<Vec<Advertisement<BlePeripheral>>, TransportError> {
        Ok(self.scan().await?)
    }
}

/// Address of a peripheral.
///
/// Some platforms (macOS) hide the MAC and report a zeroed address; the
/// platform peripheral id is used instead.
fn resolve_address(address: BDAddr, id: &impl Display) -> Option<Address> {
    if address == BDAddr::default() {
        id.to_string().parse().ok()
    } else {
        Some(Address::from_mac(address.into_inner()))
    }
}
