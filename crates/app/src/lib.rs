//! # florahub-app
//!
//! Application layer — the device acquisition pipeline and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **transport port** that radio adapters implement
//!   (discovery, connection, GATT services and characteristics)
//! - Keep the registry of advertisements seen during discovery scans
//! - Run the periodic discovery loop
//! - Drive the connect → activate → read → disconnect protocol against one
//!   device, coalescing concurrent requests per address
//! - Map driver profiles (advertised name → visible name) to pairable devices
//!
//! ## Dependency rule
//! Depends on `florahub-domain` only (plus `tokio` for channels, timers and
//! task spawning). Never imports adapter crates. Adapters depend on *this*
//! crate, not the reverse.

pub mod coordinator;
pub mod discovery;
pub mod error;
pub mod ports;
pub mod profiles;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;
