//! Advertisements — devices seen broadcasting during a discovery scan.

use crate::address::Address;

/// A broadcasting device known to the process.
///
/// `H` is the transport's connection handle. It is an opaque, cheaply
/// clonable capability owned by the radio stack; holding a copy does not
/// keep any connection open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement<H> {
    /// Primary key.
    pub address: Address,
    /// Broadcast display name (e.g. `"Flower care"`).
    pub local_name: String,
    /// Capability used to open a connection to the device.
    pub handle: H,
}

impl<H> Advertisement<H> {
    /// Create a new advertisement.
    pub fn new(address: Address, local_name: impl Into<String>, handle: H) -> Self {
        Self {
            address,
            local_name: local_name.into(),
            handle,
        }
    }
}
