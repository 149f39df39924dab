//! Acquisition and transport error types.

use std::fmt;
use std::sync::Arc;

use florahub_domain::address::Address;
use florahub_domain::error::DecodeError;

/// Failure reported by a transport adapter.
///
/// Cloneable so that one failed acquisition can be handed to every caller
/// waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// No radio adapter found on the host.
    #[error("no transport adapter available")]
    NotAvailable,

    /// The radio stack did not answer within the adapter's bounds.
    #[error("transport operation timed out")]
    Timeout,

    /// Any other failure of the underlying stack.
    #[error("transport failure")]
    Backend(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wrap an adapter-specific error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}

/// Protocol step during which a transport failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Connect,
    DiscoverServices,
    DiscoverCharacteristics,
    WriteRealtime,
    ReadData,
    ReadFirmware,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::DiscoverServices => "service discovery",
            Self::DiscoverCharacteristics => "characteristic discovery",
            Self::WriteRealtime => "realtime activation",
            Self::ReadData => "data read",
            Self::ReadFirmware => "firmware read",
        })
    }
}

/// Which mandatory characteristic(s) a device did not expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MissingCharacteristic {
    /// The realtime trigger exists but the data register does not.
    #[error("missing data characteristic")]
    Data,
    /// The data register exists but the realtime trigger does not.
    #[error("missing realtime characteristic")]
    Realtime,
    /// Neither exists: the device does not speak this protocol.
    #[error("missing data & realtime characteristic")]
    DataAndRealtime,
}

/// Why an acquisition failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AcquireError {
    /// The address has not been seen by discovery.
    #[error("unknown device {address}")]
    UnknownDevice {
        /// Requested address.
        address: Address,
    },

    /// The device does not expose the data service.
    #[error("device {address}: missing data service")]
    MissingService {
        /// Device address.
        address: Address,
    },

    /// The data service lacks a mandatory characteristic.
    #[error("device {address}: {which}")]
    MissingCharacteristic {
        /// Device address.
        address: Address,
        /// Characteristic(s) not found.
        which: MissingCharacteristic,
    },

    /// The payload could not be decoded.
    #[error("device {address}: failed to decode payload")]
    Decode {
        /// Device address.
        address: Address,
        /// Decoder failure.
        #[source]
        source: DecodeError,
    },

    /// The radio stack failed during a protocol step.
    #[error("device {address}: transport failure during {step}")]
    Transport {
        /// Device address.
        address: Address,
        /// Step that failed.
        step: Step,
        /// Adapter failure.
        #[source]
        source: TransportError,
    },

    /// The acquisition task ended without producing a result.
    #[error("device {address}: acquisition interrupted")]
    Interrupted {
        /// Device address.
        address: Address,
    },
}

impl AcquireError {
    /// Address of the device the acquisition targeted.
    #[must_use]
    pub fn address(&self) -> &Address {
        match self {
            Self::UnknownDevice { address }
            | Self::MissingService { address }
            | Self::MissingCharacteristic { address, .. }
            | Self::Decode { address, .. }
            | Self::Transport { address, .. }
            | Self::Interrupted { address } => address,
        }
    }

    /// Whether the failure was a transport timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                source: TransportError::Timeout,
                ..
            }
        )
    }
}
