//! Driver profiles — which advertised names are sensors, and how to show them.
//!
//! Each sensor family broadcasts a fixed local name. A profile maps that
//! name to the name shown when listing pairable devices, and every profile
//! name ends up in the registry allow-list.

use florahub_domain::address::Address;

use crate::registry::AdvertisementRegistry;

/// Local name broadcast by the two-buffer soil probe.
pub const FLOWER_CARE: &str = "Flower care";

/// Local name broadcast by the single-buffer stick.
pub const ROPOT: &str = "ropot";

/// A sensor family recognised by its advertised name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverProfile {
    /// Name the device broadcasts.
    pub local_name: String,
    /// Name shown to users.
    pub visible_name: String,
}

impl DriverProfile {
    /// Create a profile.
    pub fn new(local_name: impl Into<String>, visible_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            visible_name: visible_name.into(),
        }
    }

    /// The profiles shipped by default.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new(FLOWER_CARE, "Mi Flora"),
            Self::new(ROPOT, "Mi Flora Ropot"),
        ]
    }
}

/// A discovered device a user may pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairableDevice {
    /// Visible name from the matching profile.
    pub name: String,
    /// Stable key of the device.
    pub address: Address,
}

/// Add every profile's local name to the registry allow-list.
pub fn allow_all<H: Clone>(registry: &AdvertisementRegistry<H>, profiles: &[DriverProfile]) {
    for profile in profiles {
        registry.allow(profile.local_name.clone());
    }
}

/// Find the profile matching an advertised local name.
#[must_use]
pub fn find<'a>(profiles: &'a [DriverProfile], local_name: &str) -> Option<&'a DriverProfile> {
    profiles.iter().find(|p| p.local_name == local_name)
}

/// List the known devices that match a profile, ordered by address.
#[must_use]
pub fn pairable_devices<H: Clone>(
    registry: &AdvertisementRegistry<H>,
    profiles: &[DriverProfile],
) -> Vec<PairableDevice> {
    registry
        .list()
        .into_iter()
        .filter_map(|advertisement| {
            find(profiles, &advertisement.local_name).map(|profile| PairableDevice {
                name: profile.visible_name.clone(),
                address: advertisement.address,
            })
        })
        .collect()
}
