//! In-memory transport with call logging and fault injection, for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use uuid::Uuid;

use florahub_domain::address::Address;
use florahub_domain::advertisement::Advertisement;
use florahub_domain::gatt::{DATA_CHAR, DATA_SERVICE, FIRMWARE_CHAR, REALTIME_CHAR};

use crate::error::{Step, TransportError};
use crate::ports::{Characteristic, Connection, Service, Transport, TransportHandle};

/// Generic Access service, present on every device and never the one we want.
const GENERIC_ACCESS: Uuid = Uuid::from_u128(0x0000_1800_0000_1000_8000_0080_5f9b_34fb);

/// Data payload decoding to 20.1 °C, 82 386 lx, moisture 56, fertility 1561.
pub(crate) const FLOWER_CARE_DATA: [u8; 16] = [
    0xC9, 0x00, 0x00, 0xD2, 0x41, 0x01, 0x00, 0x38, 0x19, 0x06, 0, 0, 0, 0, 0, 0,
];

/// Firmware payload decoding to 99 % battery, version `3.1.8`.
pub(crate) const FLOWER_CARE_FIRMWARE: [u8; 7] = [0x63, 0x13, b'3', b'.', b'1', b'.', b'8'];

/// Combined payload decoding to 10.0 °C, moisture 300, fertility 5.
pub(crate) const ROPOT_DATA: [u8; 10] = [0x64, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x01, 0x2C, 0x05, 0x00];

pub(crate) fn address(last: u8) -> Address {
    Address::from_mac([0xC4, 0x7C, 0x8D, 0x6A, 0x12, last])
}

pub(crate) fn injected() -> TransportError {
    TransportError::backend(std::io::Error::other("injected failure"))
}

/// Scripted device behind a [`FakeHandle`].
pub(crate) struct FakeDevice {
    has_service: bool,
    characteristics: Vec<(Uuid, Vec<u8>)>,
    fault: Option<(Step, TransportError)>,
    disconnect_fails: bool,
    gate: Option<Arc<Semaphore>>,
    realtime: AtomicBool,
    log: Mutex<Vec<String>>,
}

impl FakeDevice {
    /// Two-buffer hardware: data, realtime and firmware/battery characteristics.
    pub(crate) fn flower_care() -> Self {
        Self {
            has_service: true,
            characteristics: vec![
                (REALTIME_CHAR, Vec::new()),
                (DATA_CHAR, FLOWER_CARE_DATA.to_vec()),
                (FIRMWARE_CHAR, FLOWER_CARE_FIRMWARE.to_vec()),
            ],
            fault: None,
            disconnect_fails: false,
            gate: None,
            realtime: AtomicBool::new(false),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Single-buffer hardware: data and realtime characteristics only.
    pub(crate) fn ropot() -> Self {
        Self::flower_care()
            .without(FIRMWARE_CHAR)
            .with_value(DATA_CHAR, &ROPOT_DATA)
    }

    pub(crate) fn without_service(mut self) -> Self {
        self.has_service = false;
        self
    }

    pub(crate) fn without(mut self, id: Uuid) -> Self {
        self.characteristics.retain(|(uuid, _)| *uuid != id);
        self
    }

    pub(crate) fn with_value(mut self, id: Uuid, value: &[u8]) -> Self {
        for (uuid, stored) in &mut self.characteristics {
            if *uuid == id {
                *stored = value.to_vec();
            }
        }
        self
    }

    pub(crate) fn failing_at(mut self, step: Step, err: TransportError) -> Self {
        self.fault = Some((step, err));
        self
    }

    pub(crate) fn failing_disconnect(mut self) -> Self {
        self.disconnect_fails = true;
        self
    }

    /// Hold `connect` until a permit is added to `gate`.
    pub(crate) fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn into_handle(self) -> FakeHandle {
        FakeHandle(Arc::new(self))
    }

    fn push(&self, entry: impl Into<String>) {
        self.log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(entry.into());
    }

    fn check(&self, step: Step) -> Result<(), TransportError> {
        match &self.fault {
            Some((failing, err)) if *failing == step => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

#[derive(Clone)]
pub(crate) struct FakeHandle(Arc<FakeDevice>);

impl FakeHandle {
    pub(crate) fn log(&self) -> Vec<String> {
        self.0
            .log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.log().iter().filter(|e| e.as_str() == entry).count()
    }

    pub(crate) fn position(&self, entry: &str) -> Option<usize> {
        self.log().iter().position(|e| e.as_str() == entry)
    }
}

impl TransportHandle for FakeHandle {
    type Connection = FakeConnection;

    async fn connect(&self) -> Result<FakeConnection, TransportError> {
        self.0.push("connect");
        self.0.realtime.store(false, Ordering::SeqCst);
        if let Some(gate) = &self.0.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.0.check(Step::Connect)?;
        Ok(FakeConnection(Arc::clone(&self.0)))
    }
}

pub(crate) struct FakeConnection(Arc<FakeDevice>);

impl Connection for FakeConnection {
    type Service = FakeService;

    async fn discover_services(&self) -> Result<Vec<FakeService>, TransportError> {
        self.0.push("discover services");
        self.0.check(Step::DiscoverServices)?;
        let mut services = vec![FakeService {
            device: Arc::clone(&self.0),
            id: GENERIC_ACCESS,
        }];
        if self.0.has_service {
            services.push(FakeService {
                device: Arc::clone(&self.0),
                id: DATA_SERVICE,
            });
        }
        Ok(services)
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.0.push("disconnect");
        if self.0.disconnect_fails {
            return Err(injected());
        }
        Ok(())
    }
}

pub(crate) struct FakeService {
    device: Arc<FakeDevice>,
    id: Uuid,
}

impl Service for FakeService {
    type Characteristic = FakeCharacteristic;

    fn id(&self) -> Uuid {
        self.id
    }

    async fn discover_characteristics(&self) -> Result<Vec<FakeCharacteristic>, TransportError> {
        self.device.push("discover characteristics");
        self.device.check(Step::DiscoverCharacteristics)?;
        if self.id != DATA_SERVICE {
            return Ok(Vec::new());
        }
        Ok(self
            .device
            .characteristics
            .iter()
            .map(|(id, value)| FakeCharacteristic {
                device: Arc::clone(&self.device),
                id: *id,
                value: value.clone(),
            })
            .collect())
    }
}

pub(crate) struct FakeCharacteristic {
    device: Arc<FakeDevice>,
    id: Uuid,
    value: Vec<u8>,
}

impl Characteristic for FakeCharacteristic {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn write(&self, value: &[u8]) -> Result<(), TransportError> {
        self.device
            .push(format!("write {} {value:02x?}", short(self.id)));
        tokio::task::yield_now().await;
        self.device.check(Step::WriteRealtime)?;
        if self.id == REALTIME_CHAR {
            self.device.realtime.store(true, Ordering::SeqCst);
        }
        self.device.push(format!("write done {}", short(self.id)));
        Ok(())
    }

    async fn read(&self) -> Result<Vec<u8>, TransportError> {
        self.device.push(format!("read {}", short(self.id)));
        let step = if self.id == FIRMWARE_CHAR {
            Step::ReadFirmware
        } else {
            Step::ReadData
        };
        self.device.check(step)?;
        if self.id == DATA_CHAR && !self.device.realtime.load(Ordering::SeqCst) {
            return Err(TransportError::backend(std::io::Error::other(
                "data read before realtime mode was enabled",
            )));
        }
        Ok(self.value.clone())
    }
}

/// `00001a01-…` → `1a01`.
fn short(id: Uuid) -> String {
    id.simple().to_string()[4..8].to_owned()
}

/// Transport returning scripted discovery results, one per call.
#[derive(Default)]
pub(crate) struct FakeTransport {
    scans: Mutex<VecDeque<Result<Vec<Advertisement<FakeHandle>>, TransportError>>>,
    calls: AtomicUsize,
}

impl FakeTransport {
    pub(crate) fn with_scans(
        scans: impl IntoIterator<Item = Result<Vec<Advertisement<FakeHandle>>, TransportError>>,
    ) -> Self {
        Self {
            scans: Mutex::new(scans.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for FakeTransport {
    type Handle = FakeHandle;

    async fn discover(&self) -> Result<Vec<Advertisement<FakeHandle>>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .scans
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }
}
