//! # florahub-adapter-ble
//!
//! BLE adapter — implements the florahub transport port on top of
//! `btleplug`.
//!
//! ## How it works
//!
//! Plant sensors do not broadcast their measurements: they must be
//! connected to, switched into realtime mode and read over GATT. This
//! adapter provides the two halves the acquisition core needs:
//!
//! - [`BleTransport`] scans for advertisements and hands out one
//!   [`BlePeripheral`] handle per device seen,
//! - [`BlePeripheral`] opens GATT connections and exposes services and
//!   characteristics, every operation bounded by a configurable timeout.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `florahub-app` and `florahub-domain`.

mod config;
mod error;
mod gatt;
mod scanner;

pub use config::BleConfig;
pub use error::BleError;
pub use gatt::{BleCharacteristic, BleConnection, BlePeripheral, BleService};
pub use scanner::BleTransport;
