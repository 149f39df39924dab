//! # florahub-domain
//!
//! Pure domain model for the florahub plant sensor reader.
//!
//! ## Responsibilities
//! - Foundational types: device addresses, error conventions, timestamps
//! - Define **Advertisements** (a broadcasting device known to the process)
//! - Define **Sensor readings** (the typed output of an acquisition)
//! - Decode raw GATT characteristic payloads into sensor readings
//! - Hold the fixed GATT identifiers and activation payload of the protocol
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod address;
pub mod advertisement;
pub mod decoder;
pub mod gatt;
pub mod reading;
