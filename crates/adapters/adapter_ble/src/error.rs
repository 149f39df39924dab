//! BLE adapter error types.

use florahub_app::error::TransportError;

/// Errors specific to the BLE adapter.
#[derive(Debug, thiserror::Error)]
pub enum BleError {
    /// No BLE adapter found on the host.
    #[error("no BLE adapter available")]
    NotAvailable,

    /// A GATT operation did not complete within the configured bound.
    #[error("BLE operation timed out")]
    Timeout,

    /// BLE scan, connection or GATT operation failed.
    #[error("BLE stack error")]
    Btle(#[from] btleplug::Error),
}

impl From<BleError> for TransportError {
    fn from(err: BleError) -> Self {
        match err {
            BleError::NotAvailable => Self::NotAvailable,
            BleError::Timeout | BleError::Btle(btleplug::Error::TimedOut(_)) => Self::Timeout,
            other @ BleError::Btle(_) => Self::backend(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn should_display_not_available_error() {
        let err = BleError::NotAvailable;
        assert_eq!(err.to_string(), "no BLE adapter available");
    }

    #[test]
    fn should_display_stack_error() {
        let err = BleError::Btle(btleplug::Error::DeviceNotFound);
        assert_eq!(err.to_string(), "BLE stack error");
    }

    #[test]
    fn should_convert_not_available_to_transport_error() {
        let err: TransportError = BleError::NotAvailable.into();
        assert!(matches!(err, TransportError::NotAvailable));
    }

    #[test]
    fn should_convert_timeouts_to_transport_timeout() {
        let err: TransportError = BleError::Timeout.into();
        assert!(matches!(err, TransportError::Timeout));

        let err: TransportError =
            BleError::Btle(btleplug::Error::TimedOut(Duration::from_secs(5))).into();
        assert!(matches!(err, TransportError::Timeout));
    }

    #[test]
    fn should_convert_stack_error_to_backend_error() {
        let err: TransportError = BleError::Btle(btleplug::Error::DeviceNotFound).into();
        assert!(matches!(err, TransportError::Backend(_)));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "BLE stack error");
    }
}
