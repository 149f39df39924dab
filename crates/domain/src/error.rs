//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors with `thiserror`; these are the
//! ones raised by pure domain logic.

use crate::reading::Field;

/// A characteristic payload could not be decoded into a sensor reading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ends before the requested field does.
    #[error("payload too short for {field}: need {required} bytes, got {actual}")]
    TooShort {
        /// Field that could not be extracted.
        field: Field,
        /// Minimum buffer length needed for the field.
        required: usize,
        /// Length of the buffer supplied.
        actual: usize,
    },

    /// The field lives in the secondary (firmware/battery) buffer but none was supplied.
    #[error("no firmware/battery payload supplied for {field}")]
    MissingBuffer {
        /// Field that could not be extracted.
        field: Field,
    },

    /// The firmware version bytes are not ASCII text.
    #[error("firmware version is not ASCII")]
    NotAscii,
}

/// A string could not be parsed into an [`Address`](crate::address::Address).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseAddressError {
    /// The input was empty or only whitespace.
    #[error("address must not be empty")]
    Empty,

    /// The input contains characters outside of `[0-9A-Za-z:-]`.
    #[error("invalid character {0:?} in address")]
    InvalidCharacter(char),
}
