//! Sensor readings and the set of fields a decode should extract.

use std::fmt;

use serde::Serialize;

/// Decoded measurements from one acquisition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    /// Temperature in degrees Celsius, 0.1 °C resolution.
    pub temperature: f64,
    /// Light intensity in lux.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub luminance: Option<u32>,
    /// Soil moisture.
    pub moisture: u16,
    /// Soil fertility (conductivity) in µS/cm.
    pub fertility: u16,
    /// Battery level percentage (0–100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<u8>,
    /// Firmware version string (e.g. `"3.1.8"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
}

/// A single measurement field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Temperature,
    Luminance,
    Moisture,
    Fertility,
    BatteryLevel,
    FirmwareVersion,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Temperature => "temperature",
            Self::Luminance => "luminance",
            Self::Moisture => "moisture",
            Self::Fertility => "fertility",
            Self::BatteryLevel => "battery level",
            Self::FirmwareVersion => "firmware version",
        })
    }
}

/// Optional fields requested from the decoder.
///
/// Temperature, moisture and fertility are always decoded; the rest depend
/// on which characteristics the device exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Fields {
    pub luminance: bool,
    pub battery_level: bool,
    pub firmware_version: bool,
}

impl Fields {
    /// Only temperature, moisture and fertility.
    #[must_use]
    pub const fn core() -> Self {
        Self {
            luminance: false,
            battery_level: false,
            firmware_version: false,
        }
    }

    /// Every field, from both the data and the firmware/battery buffers.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            luminance: true,
            battery_level: true,
            firmware_version: true,
        }
    }

    /// Whether any requested field lives in the firmware/battery buffer.
    #[must_use]
    pub const fn needs_secondary(self) -> bool {
        self.battery_level || self.firmware_version
    }
}
