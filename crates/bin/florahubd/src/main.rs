//! # florahubd — florahub daemon
//!
//! Composition root that wires the BLE transport, the discovery loop and
//! the acquisition core together.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize structured logging
//! - Open the BLE adapter
//! - Build the registry and the acquisition coordinator
//! - Start the poller and the discovery loop
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod poller;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use florahub_adapter_ble::{BlePeripheral, BleTransport};
use florahub_app::coordinator::AcquisitionCoordinator;
use florahub_app::discovery::DiscoveryLoop;
use florahub_app::profiles;
use florahub_app::registry::AdvertisementRegistry;

use crate::config::Config;
use crate::poller::Poller;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let profiles = config.driver_profiles();

    // Registry
    let registry: Arc<AdvertisementRegistry<BlePeripheral>> = Arc::new(AdvertisementRegistry::new());
    profiles::allow_all(&registry, &profiles);

    // Transport
    let transport = BleTransport::open(&config.ble).await?;

    // Acquisition
    let coordinator = AcquisitionCoordinator::new(Arc::clone(&registry));
    let poller = Poller::new(coordinator, profiles, config.poll_interval())
        .start(Arc::clone(&registry));

    // Discovery
    let discovery =
        DiscoveryLoop::new(transport, Arc::clone(&registry), config.discovery_interval()).start();

    tracing::info!("florahubd running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    discovery.abort();
    poller.abort();

    Ok(())
}
