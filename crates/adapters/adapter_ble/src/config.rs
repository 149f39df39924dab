//! BLE transport configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the BLE transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BleConfig {
    /// How long each discovery scan listens for advertisements, in seconds.
    pub scan_duration_secs: u16,
    /// Upper bound for every GATT operation (connect, discover, read,
    /// write, disconnect), in seconds.
    pub operation_timeout_secs: u16,
}

impl BleConfig {
    /// Scan duration as a [`Duration`].
    #[must_use]
    pub fn scan_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.scan_duration_secs))
    }

    /// Per-operation timeout as a [`Duration`].
    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.operation_timeout_secs))
    }
}

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            scan_duration_secs: 10,
            operation_timeout_secs: 10,
        }
    }
}
