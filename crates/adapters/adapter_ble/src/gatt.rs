//! GATT access through btleplug, implementing the transport port.
//!
//! Every operation is bounded by the configured operation timeout. The
//! acquisition core decides what to connect to, write and read; this module
//! only maps those calls onto a btleplug [`Peripheral`].

use std::future::Future;
use std::time::Duration;

use btleplug::api::{Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use uuid::Uuid;

use florahub_app::error::TransportError;
use florahub_app::ports::{Characteristic, Connection, Service, TransportHandle};

use crate::error::BleError;

/// Await a btleplug operation for at most `timeout`.
async fn bounded<T>(
    timeout: Duration,
    operation: impl Future<Output = Result<T, btleplug::Error>>,
) -> Result<T, TransportError> {
    let result = tokio::time::timeout(timeout, operation)
        .await
        .map_err(|_| BleError::Timeout)?;
    Ok(result.map_err(BleError::from)?)
}

/// Handle to a discovered peripheral; cloning does not open anything.
#[derive(Clone)]
pub struct BlePeripheral {
    peripheral: Peripheral,
    timeout: Duration,
}

impl BlePeripheral {
    pub(crate) fn new(peripheral: Peripheral, timeout: Duration) -> Self {
        Self {
            peripheral,
            timeout,
        }
    }
}

impl TransportHandle for BlePeripheral {
    type Connection = BleConnection;

    async fn connect(&self) -> Result<BleConnection, TransportError> {
        bounded(self.timeout, self.peripheral.connect()).await?;
        Ok(BleConnection {
            peripheral: self.peripheral.clone(),
            timeout: self.timeout,
        })
    }
}

/// An open GATT connection.
pub struct BleConnection {
    peripheral: Peripheral,
    timeout: Duration,
}

impl Connection for BleConnection {
    type Service = BleService;

    async fn discover_services(&self) -> Result<Vec<BleService>, TransportError> {
        bounded(self.timeout, self.peripheral.discover_services()).await?;
        Ok(self
            .peripheral
            .services()
            .into_iter()
            .map(|service| BleService {
                peripheral: self.peripheral.clone(),
                timeout: self.timeout,
                service,
            })
            .collect())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        bounded(self.timeout, self.peripheral.disconnect()).await
    }
}

/// A GATT service of a connected peripheral.
pub struct BleService {
    peripheral: Peripheral,
    timeout: Duration,
    service: btleplug::api::Service,
}

impl Service for BleService {
    type Characteristic = BleCharacteristic;

    fn id(&self) -> Uuid {
        self.service.uuid
    }

    /// btleplug resolves characteristics together with services, so this
    /// never talks to the device.
    async fn discover_characteristics(&self) -> Result<Vec<BleCharacteristic>, TransportError> {
        Ok(self
            .service
            .characteristics
            .iter()
            .cloned()
            .map(|characteristic| BleCharacteristic {
                peripheral: self.peripheral.clone(),
                timeout: self.timeout,
                characteristic,
            })
            .collect())
    }
}

/// A GATT characteristic of a connected peripheral.
pub struct BleCharacteristic {
    peripheral: Peripheral,
    timeout: Duration,
    characteristic: btleplug::api::Characteristic,
}

impl Characteristic for BleCharacteristic {
    fn id(&self) -> Uuid {
        self.characteristic.uuid
    }

    async fn write(&self, value: &[u8]) -> Result<(), TransportError> {
        bounded(
            self.timeout,
            self.peripheral
                .write(&self.characteristic, value, WriteType::WithResponse),
        )
        .await
    }

    async fn read(&self) -> Result<Vec<u8>, TransportError> {
        bounded(self.timeout, self.peripheral.read(&self.characteristic)).await
    }
}
