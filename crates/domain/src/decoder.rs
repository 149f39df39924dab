//! Binary decoder for the plant sensor GATT payloads.
//!
//! Pure functions operating on raw `&[u8]` slices. Two hardware layouts
//! exist and are told apart only by which characteristics the device
//! exposes:
//!
//! - **combined**: a single data buffer carrying temperature, moisture and
//!   fertility (the `ropot` stick),
//! - **two-buffer**: the same data buffer plus a separate firmware/battery
//!   buffer (the `Flower care` probe).
//!
//! Data buffer:
//!
//! | Bytes | Type | Field |
//! |-------|------|-------|
//! | 0–1 | u16 LE (×0.1 °C) | Temperature |
//! | 3–6 | u32 LE (lux) | Luminance |
//! | 6–7 | u16 **BE** | Moisture |
//! | 8–9 | u16 LE (µS/cm) | Fertility |
//!
//! Firmware/battery buffer:
//!
//! | Bytes | Type | Field |
//! |-------|------|-------|
//! | 0 | u8 (%) | Battery level |
//! | 1 | — | Separator |
//! | 2.. | ASCII | Firmware version |
//!
//! No total length is assumed; a buffer only has to reach the end of the
//! fields actually requested.

use crate::error::DecodeError;
use crate::reading::{Field, Fields, SensorReading};

const TEMPERATURE_OFFSET: usize = 0;
const LUMINANCE_OFFSET: usize = 3;
const MOISTURE_OFFSET: usize = 6;
const FERTILITY_OFFSET: usize = 8;
const BATTERY_OFFSET: usize = 0;
const FIRMWARE_OFFSET: usize = 2;

/// Decode a data buffer, and optionally a firmware/battery buffer, into a
/// [`SensorReading`].
///
/// Only the optional fields set in `fields` are extracted; the others are
/// left as `None` even when the bytes are there.
///
/// # Errors
///
/// Returns [`DecodeError::TooShort`] when a buffer ends before a requested
/// field, [`DecodeError::MissingBuffer`] when battery or firmware is
/// requested without a secondary buffer, and [`DecodeError::NotAscii`] when
/// the firmware version is not ASCII.
pub fn decode(
    data: &[u8],
    secondary: Option<&[u8]>,
    fields: Fields,
) -> Result<SensorReading, DecodeError> {
    let temperature_raw = u16::from_le_bytes(take(data, TEMPERATURE_OFFSET, Field::Temperature)?);
    let moisture = u16::from_be_bytes(take(data, MOISTURE_OFFSET, Field::Moisture)?);
    let fertility = u16::from_le_bytes(take(data, FERTILITY_OFFSET, Field::Fertility)?);

    let luminance = if fields.luminance {
        Some(u32::from_le_bytes(take(
            data,
            LUMINANCE_OFFSET,
            Field::Luminance,
        )?))
    } else {
        None
    };

    let secondary = if fields.needs_secondary() {
        let field = if fields.battery_level {
            Field::BatteryLevel
        } else {
            Field::FirmwareVersion
        };
        Some(secondary.ok_or(DecodeError::MissingBuffer { field })?)
    } else {
        None
    };

    let battery_level = match secondary {
        Some(buffer) if fields.battery_level => {
            let [level] = take(buffer, BATTERY_OFFSET, Field::BatteryLevel)?;
            Some(level)
        }
        _ => None,
    };

    let firmware_version = match secondary {
        Some(buffer) if fields.firmware_version => Some(firmware_version(buffer)?),
        _ => None,
    };

    Ok(SensorReading {
        temperature: f64::from(temperature_raw) / 10.0,
        luminance,
        moisture,
        fertility,
        battery_level,
        firmware_version,
    })
}

/// Copy `N` bytes starting at `offset`, failing if the buffer is too short.
fn take<const N: usize>(buffer: &[u8], offset: usize, field: Field) -> Result<[u8; N], DecodeError> {
    let required = offset + N;
    buffer
        .get(offset..required)
        .and_then(|slice| <[u8; N]>::try_from(slice).ok())
        .ok_or(DecodeError::TooShort {
            field,
            required,
            actual: buffer.len(),
        })
}

fn firmware_version(buffer: &[u8]) -> Result<String, DecodeError> {
    let bytes = buffer.get(FIRMWARE_OFFSET..).ok_or(DecodeError::TooShort {
        field: Field::FirmwareVersion,
        required: FIRMWARE_OFFSET,
        actual: buffer.len(),
    })?;
    if !bytes.is_ascii() {
        return Err(DecodeError::NotAscii);
    }
    let version: String = bytes.iter().copied().map(char::from).collect();
    Ok(version.trim_end_matches('\0').to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data_payload() -> [u8; 16] {
        let mut data = [0u8; 16];
        // temp: 201 (0x00C9) LE → 20.1 °C
        data[0] = 0xC9;
        data[1] = 0x00;
        // light: 82_386 (0x000141D2) LE → bytes [0xD2, 0x41, 0x01, 0x00]
        data[3] = 0xD2;
        data[4] = 0x41;
        data[5] = 0x01;
        data[6] = 0x00;
        // moisture: BE over bytes 6–7 → 0x0038 = 56
        data[7] = 0x38;
        // fertility: 1561 (0x0619) LE → [0x19, 0x06]
        data[8] = 0x19;
        data[9] = 0x06;
        data
    }

    fn sample_firmware_payload() -> [u8; 7] {
        [
            0x63, // battery: 99%
            0x13, // separator
            b'3', b'.', b'1', b'.', b'8', // firmware "3.1.8"
        ]
    }

    // ── Data buffer ─────────────────────────────────────────────────────

    #[test]
    fn should_decode_combined_layout_core_fields() {
        let data = [0x64, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x01, 0x2C, 0x05, 0x00];
        let reading = decode(&data, None, Fields::core()).unwrap();
        assert!((reading.temperature - 10.0).abs() < f64::EPSILON);
        assert_eq!(reading.moisture, 300);
        assert_eq!(reading.fertility, 5);
        assert_eq!(reading.luminance, None);
        assert_eq!(reading.battery_level, None);
        assert_eq!(reading.firmware_version, None);
    }

    #[test]
    fn should_read_luminance_little_endian_from_offset_three() {
        let mut data = [0u8; 10];
        data[3] = 0xFF;
        let fields = Fields {
            luminance: true,
            ..Fields::core()
        };
        let reading = decode(&data, None, fields).unwrap();
        assert_eq!(reading.luminance, Some(255));
    }

    #[test]
    fn should_read_moisture_big_endian() {
        let mut data = [0u8; 10];
        data[6] = 0x01;
        data[7] = 0x2C;
        let reading = decode(&data, None, Fields::core()).unwrap();
        assert_eq!(reading.moisture, 0x012C);
    }

    #[test]
    fn should_decode_two_buffer_layout() {
        let data = sample_data_payload();
        let firmware = sample_firmware_payload();
        let reading = decode(&data, Some(&firmware), Fields::all()).unwrap();
        assert!((reading.temperature - 20.1).abs() < 0.01);
        assert_eq!(reading.luminance, Some(82_386));
        assert_eq!(reading.moisture, 56);
        assert_eq!(reading.fertility, 1561);
        assert_eq!(reading.battery_level, Some(99));
        assert_eq!(reading.firmware_version.as_deref(), Some("3.1.8"));
    }

    #[test]
    fn should_decode_max_luminance_and_fertility() {
        let mut data = [0u8; 10];
        data[3..7].copy_from_slice(&[0xFF; 4]);
        data[8] = 0xFF;
        data[9] = 0xFF;
        let fields = Fields {
            luminance: true,
            ..Fields::core()
        };
        let reading = decode(&data, None, fields).unwrap();
        assert_eq!(reading.luminance, Some(u32::MAX));
        assert_eq!(reading.fertility, u16::MAX);
    }

    #[test]
    fn should_ignore_trailing_bytes() {
        let data = sample_data_payload();
        let reading = decode(&data, None, Fields::core()).unwrap();
        assert_eq!(reading.fertility, 1561);
    }

    #[test]
    fn should_reject_data_shorter_than_fertility_field() {
        let data = [0u8; 9];
        let err = decode(&data, None, Fields::core()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooShort {
                field: Field::Fertility,
                required: 10,
                actual: 9,
            }
        );
    }

    #[test]
    fn should_reject_empty_data() {
        let err = decode(&[], None, Fields::core()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooShort {
                field: Field::Temperature,
                ..
            }
        ));
    }

    // ── Firmware/battery buffer ─────────────────────────────────────────

    #[test]
    fn should_reject_battery_without_secondary_buffer() {
        let data = sample_data_payload();
        let err = decode(&data, None, Fields::all()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingBuffer {
                field: Field::BatteryLevel
            }
        );
    }

    #[test]
    fn should_report_firmware_when_only_firmware_requested_without_buffer() {
        let data = sample_data_payload();
        let fields = Fields {
            firmware_version: true,
            ..Fields::core()
        };
        let err = decode(&data, None, fields).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingBuffer {
                field: Field::FirmwareVersion
            }
        );
    }

    #[test]
    fn should_ignore_secondary_buffer_when_not_requested() {
        let data = sample_data_payload();
        let reading = decode(&data, Some(&[]), Fields::core()).unwrap();
        assert_eq!(reading.battery_level, None);
        assert_eq!(reading.firmware_version, None);
    }

    #[test]
    fn should_reject_empty_secondary_buffer() {
        let data = sample_data_payload();
        let err = decode(&data, Some(&[]), Fields::all()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooShort {
                field: Field::BatteryLevel,
                required: 1,
                actual: 0,
            }
        );
    }

    #[test]
    fn should_reject_secondary_buffer_without_version_offset() {
        let data = sample_data_payload();
        let err = decode(&data, Some(&[0x50]), Fields::all()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooShort {
                field: Field::FirmwareVersion,
                required: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn should_decode_empty_firmware_version() {
        let data = sample_data_payload();
        let reading = decode(&data, Some(&[0x50, 0x00]), Fields::all()).unwrap();
        assert_eq!(reading.battery_level, Some(80));
        assert_eq!(reading.firmware_version.as_deref(), Some(""));
    }

    #[test]
    fn should_strip_trailing_nul_from_firmware_version() {
        let data = sample_data_payload();
        let firmware = [0x40, 0x13, b'2', b'.', b'7', b'.', b'0', 0x00, 0x00];
        let reading = decode(&data, Some(&firmware), Fields::all()).unwrap();
        assert_eq!(reading.firmware_version.as_deref(), Some("2.7.0"));
    }

    #[test]
    fn should_reject_non_ascii_firmware_version() {
        let data = sample_data_payload();
        let firmware = [0x40, 0x13, 0xC3, 0xA9];
        let err = decode(&data, Some(&firmware), Fields::all()).unwrap_err();
        assert_eq!(err, DecodeError::NotAscii);
    }

    #[test]
    fn should_be_deterministic() {
        let data = sample_data_payload();
        let firmware = sample_firmware_payload();
        let first = decode(&data, Some(&firmware), Fields::all()).unwrap();
        let second = decode(&data, Some(&firmware), Fields::all()).unwrap();
        assert_eq!(first, second);
    }
}
