//! Transport port — the wireless stack as seen by the acquisition core.
//!
//! The radio adapter performs link-layer discovery and connection
//! establishment; the core only walks the capability chain
//! `Transport → TransportHandle → Connection → Service → Characteristic`.
//! Every operation may suspend while the radio stack answers, and each
//! implementation bounds its own operations (surfacing
//! [`TransportError::Timeout`]).

use std::future::Future;
use std::sync::Arc;

use florahub_domain::advertisement::Advertisement;
use uuid::Uuid;

use crate::error::TransportError;

/// Entry point of the wireless stack.
pub trait Transport: Send + Sync + 'static {
    /// Capability used to open a connection to one discovered device.
    type Handle: TransportHandle;

    /// Run one discovery scan and return every device seen broadcasting.
    fn discover(
        &self,
    ) -> impl Future<Output = Result<Vec<Advertisement<Self::Handle>>, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    type Handle = T::Handle;

    fn discover(
        &self,
    ) -> impl Future<Output = Result<Vec<Advertisement<Self::Handle>>, TransportError>> + Send {
        T::discover(self)
    }
}

/// Opaque, cheaply clonable capability pointing at one device.
pub trait TransportHandle: Clone + Send + Sync + 'static {
    /// Open connection type.
    type Connection: Connection;

    /// Open a connection to the device.
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// An open connection to a device.
pub trait Connection: Send + Sync {
    /// GATT service type.
    type Service: Service;

    /// Enumerate the services the device exposes.
    fn discover_services(
        &self,
    ) -> impl Future<Output = Result<Vec<Self::Service>, TransportError>> + Send;

    /// Close the connection.
    fn disconnect(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// A GATT service on an open connection.
pub trait Service: Send + Sync {
    /// GATT characteristic type.
    type Characteristic: Characteristic;

    /// Service UUID.
    fn id(&self) -> Uuid;

    /// Enumerate the characteristics of this service.
    fn discover_characteristics(
        &self,
    ) -> impl Future<Output = Result<Vec<Self::Characteristic>, TransportError>> + Send;
}

/// A readable/writable data slot of a service.
pub trait Characteristic: Send + Sync {
    /// Characteristic UUID.
    fn id(&self) -> Uuid;

    /// Write `value`, resolving once the device acknowledged it.
    fn write(&self, value: &[u8]) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Read the current value.
    fn read(&self) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}
