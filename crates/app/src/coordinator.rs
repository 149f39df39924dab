//! Acquisition coordinator — pulls one sensor reading from one device.
//!
//! Provides [`AcquisitionCoordinator::acquire`] which resolves the address
//! through the registry, connects, enables realtime mode, reads the data
//! (and, when present, firmware/battery) characteristics, decodes them and
//! always disconnects, even on error.
//!
//! At most one protocol run is in flight per address. Concurrent requests
//! for the same address join the running one through its ticket and all
//! observe the same outcome.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use florahub_domain::address::Address;
use florahub_domain::decoder;
use florahub_domain::gatt::{
    DATA_CHAR, DATA_SERVICE, FIRMWARE_CHAR, REALTIME_ACTIVATION, REALTIME_CHAR,
};
use florahub_domain::reading::{Fields, SensorReading};

use crate::error::{AcquireError, MissingCharacteristic, Step, TransportError};
use crate::ports::{Characteristic, Connection, Service, TransportHandle};
use crate::registry::AdvertisementRegistry;

type Outcome = Option<Result<SensorReading, AcquireError>>;

/// Shared, not-yet-resolved result of a running acquisition.
type Ticket = watch::Receiver<Outcome>;

struct Inner<H> {
    registry: Arc<AdvertisementRegistry<H>>,
    tickets: Mutex<HashMap<Address, Ticket>>,
}

impl<H> Inner<H> {
    fn lock_tickets(&self) -> MutexGuard<'_, HashMap<Address, Ticket>> {
        self.tickets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes the ticket of a run when dropped, whichever way the run ends.
struct TicketGuard<H> {
    inner: Arc<Inner<H>>,
    address: Address,
}

impl<H> Drop for TicketGuard<H> {
    fn drop(&mut self) {
        self.inner.lock_tickets().remove(&self.address);
    }
}

/// Drives the acquisition protocol against devices known to a registry.
///
/// Cheap to clone; clones share the same in-flight tickets.
pub struct AcquisitionCoordinator<H> {
    inner: Arc<Inner<H>>,
}

impl<H> Clone for AcquisitionCoordinator<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: TransportHandle> AcquisitionCoordinator<H> {
    /// Create a coordinator resolving addresses through `registry`.
    #[must_use]
    pub fn new(registry: Arc<AdvertisementRegistry<H>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                tickets: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Acquire a fresh reading from the device at `address`.
    ///
    /// Joins the running acquisition when one is already in flight for the
    /// address. The protocol runs on its own task, so it completes (and
    /// disconnects) even if every caller gives up waiting. Nothing is
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::UnknownDevice`] when the address was never
    /// discovered, [`AcquireError::MissingService`] /
    /// [`AcquireError::MissingCharacteristic`] when the device does not
    /// speak the protocol, [`AcquireError::Transport`] when the radio stack
    /// fails (including timeouts) and [`AcquireError::Decode`] when the
    /// payload is too short.
    #[tracing::instrument(skip_all, fields(%address))]
    pub async fn acquire(&self, address: &Address) -> Result<SensorReading, AcquireError> {
        let mut ticket = self.ticket(address);
        let outcome = match ticket.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| {
            Err(AcquireError::Interrupted {
                address: address.clone(),
            })
        })
    }

    /// Whether an acquisition is currently running for `address`.
    #[must_use]
    pub fn is_in_flight(&self, address: &Address) -> bool {
        self.inner.lock_tickets().contains_key(address)
    }

    /// Return the ticket for `address`, starting a run if there is none.
    fn ticket(&self, address: &Address) -> Ticket {
        let mut tickets = self.inner.lock_tickets();
        if let Some(ticket) = tickets.get(address) {
            tracing::debug!(%address, "joining in-flight acquisition");
            return ticket.clone();
        }

        let (sender, ticket) = watch::channel(None);
        tickets.insert(address.clone(), ticket.clone());
        drop(tickets);

        let guard = TicketGuard {
            inner: Arc::clone(&self.inner),
            address: address.clone(),
        };
        tokio::spawn(async move {
            let result = run(&guard.inner.registry, &guard.address).await;
            drop(guard);
            // fails only when every caller stopped waiting
            let _ = sender.send(Some(result));
        });

        ticket
    }
}

/// One full protocol run: look up, connect, read, always disconnect.
async fn run<H: TransportHandle>(
    registry: &AdvertisementRegistry<H>,
    address: &Address,
) -> Result<SensorReading, AcquireError> {
    let advertisement = registry
        .get(address)
        .ok_or_else(|| AcquireError::UnknownDevice {
            address: address.clone(),
        })?;

    tracing::debug!(%address, name = %advertisement.local_name, "connecting");
    let connection = advertisement
        .handle
        .connect()
        .await
        .map_err(|source| transport(address, Step::Connect, source))?;

    let result = read_connected(&connection, address).await;

    if let Err(err) = connection.disconnect().await {
        tracing::warn!(%err, %address, "failed to disconnect device");
    }

    match &result {
        Ok(_) => tracing::debug!(%address, "acquisition complete"),
        Err(err) => tracing::debug!(%err, %address, "acquisition failed"),
    }
    result
}

/// Inner protocol, separated so the caller can always disconnect.
async fn read_connected<C: Connection>(
    connection: &C,
    address: &Address,
) -> Result<SensorReading, AcquireError> {
    let service = connection
        .discover_services()
        .await
        .map_err(|source| transport(address, Step::DiscoverServices, source))?
        .into_iter()
        .find(|service| service.id() == DATA_SERVICE)
        .ok_or_else(|| AcquireError::MissingService {
            address: address.clone(),
        })?;

    let characteristics = service
        .discover_characteristics()
        .await
        .map_err(|source| transport(address, Step::DiscoverCharacteristics, source))?;
    let Resolved {
        data,
        realtime,
        firmware,
    } = Resolved::from(characteristics);

    let (data, realtime) = match (data, realtime) {
        (Some(data), Some(realtime)) => (data, realtime),
        (data, realtime) => {
            let which = match (data, realtime) {
                (None, None) => MissingCharacteristic::DataAndRealtime,
                (Some(_), None) => MissingCharacteristic::Realtime,
                _ => MissingCharacteristic::Data,
            };
            return Err(AcquireError::MissingCharacteristic {
                address: address.clone(),
                which,
            });
        }
    };

    // the data register only yields live values once realtime mode is on
    realtime
        .write(&REALTIME_ACTIVATION)
        .await
        .map_err(|source| transport(address, Step::WriteRealtime, source))?;
    tracing::trace!(%address, "realtime mode enabled");

    let read_data = async {
        data.read()
            .await
            .map_err(|source| transport(address, Step::ReadData, source))
    };
    let (data_bytes, firmware_bytes) = match &firmware {
        Some(firmware) => {
            let read_firmware = async {
                firmware
                    .read()
                    .await
                    .map_err(|source| transport(address, Step::ReadFirmware, source))
            };
            let (data_bytes, firmware_bytes) = tokio::try_join!(read_data, read_firmware)?;
            (data_bytes, Some(firmware_bytes))
        }
        None => (read_data.await?, None),
    };

    let fields = if firmware_bytes.is_some() {
        Fields::all()
    } else {
        Fields::core()
    };
    decoder::decode(&data_bytes, firmware_bytes.as_deref(), fields).map_err(|source| {
        AcquireError::Decode {
            address: address.clone(),
            source,
        }
    })
}

/// The three logical characteristics of the data service.
struct Resolved<C> {
    data: Option<C>,
    realtime: Option<C>,
    firmware: Option<C>,
}

impl<C: Characteristic> From<Vec<C>> for Resolved<C> {
    fn from(characteristics: Vec<C>) -> Self {
        let mut resolved = Self {
            data: None,
            realtime: None,
            firmware: None,
        };
        for characteristic in characteristics {
            let id = characteristic.id();
            if id == DATA_CHAR {
                resolved.data = Some(characteristic);
            } else if id == REALTIME_CHAR {
                resolved.realtime = Some(characteristic);
            } else if id == FIRMWARE_CHAR {
                resolved.firmware = Some(characteristic);
            }
        }
        resolved
    }
}

fn transport(address: &Address, step: Step, source: TransportError) -> AcquireError {
    AcquireError::Transport {
        address: address.clone(),
        step,
        source,
    }
}
