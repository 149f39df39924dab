//! Fixed GATT identifiers of the plant sensor protocol.
//!
//! These must match the hardware exactly.

use uuid::Uuid;

/// Service exposing the sensor characteristics.
pub const DATA_SERVICE: Uuid = Uuid::from_u128(0x0000_1204_0000_1000_8000_0080_5f9b_34fb);

/// Realtime trigger register (write [`REALTIME_ACTIVATION`] before reading data).
pub const REALTIME_CHAR: Uuid = Uuid::from_u128(0x0000_1a00_0000_1000_8000_0080_5f9b_34fb);

/// Sensor data register.
pub const DATA_CHAR: Uuid = Uuid::from_u128(0x0000_1a01_0000_1000_8000_0080_5f9b_34fb);

/// Battery level and firmware version register. Absent on single-buffer hardware.
pub const FIRMWARE_CHAR: Uuid = Uuid::from_u128(0x0000_1a02_0000_1000_8000_0080_5f9b_34fb);

/// Payload enabling realtime data mode.
pub const REALTIME_ACTIVATION: [u8; 2] = [0xA0, 0x1F];
