//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp attached to readings once they leave the acquisition core.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
