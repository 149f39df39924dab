//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `florahub.toml` in the working directory (or the file named by
//! `FLORAHUB_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use florahub_adapter_ble::BleConfig;
use florahub_app::profiles::DriverProfile;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Discovery loop settings.
    pub discovery: DiscoveryConfig,
    /// Periodic acquisition settings.
    pub acquisition: AcquisitionConfig,
    /// BLE transport settings.
    pub ble: BleConfig,
    /// Sensor families to discover.
    pub profiles: Vec<ProfileConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Discovery loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Seconds between two discovery scans.
    pub interval_secs: u64,
}

/// Periodic acquisition configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Seconds between two readings of the same device.
    pub poll_interval_secs: u64,
}

/// A sensor family: the name it broadcasts and the name to show.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    /// Advertised local name (e.g. `"Flower care"`).
    pub local_name: String,
    /// Display name (e.g. `"Mi Flora"`).
    pub visible_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            discovery: DiscoveryConfig::default(),
            acquisition: AcquisitionConfig::default(),
            ble: BleConfig::default(),
            profiles: DriverProfile::builtin()
                .into_iter()
                .map(|profile| ProfileConfig {
                    local_name: profile.local_name,
                    visible_name: profile.visible_name,
                })
                .collect(),
        }
    }
}

impl Config {
    /// Load configuration from `florahub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("FLORAHUB_CONFIG").unwrap_or_else(|_| "florahub.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FLORAHUB_DISCOVERY_INTERVAL") {
            if let Ok(secs) = val.parse() {
                self.discovery.interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("FLORAHUB_POLL_INTERVAL") {
            if let Ok(secs) = val.parse() {
                self.acquisition.poll_interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("FLORAHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.discovery.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "discovery interval must be non-zero".to_string(),
            ));
        }
        if self.acquisition.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll interval must be non-zero".to_string(),
            ));
        }
        if self.ble.scan_duration_secs == 0 || self.ble.operation_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "BLE scan duration and operation timeout must be non-zero".to_string(),
            ));
        }
        if self.profiles.is_empty() {
            return Err(ConfigError::Validation(
                "at least one profile is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Period of the discovery loop.
    #[must_use]
    pub fn discovery_interval(&self) -> Duration {
        Duration::from_secs(self.discovery.interval_secs)
    }

    /// Period between two readings of one device.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.acquisition.poll_interval_secs)
    }

    /// Configured profiles as driver profiles.
    #[must_use]
    pub fn driver_profiles(&self) -> Vec<DriverProfile> {
        self.profiles
            .iter()
            .map(|p| DriverProfile::new(p.local_name.clone(), p.visible_name.clone()))
            .collect()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "florahubd=info,florahub_app=info,florahub_adapter_ble=info".to_string(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 900,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
