//! Store configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default bound on a single remote call; matches the HTTP client's request
/// timeout.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  /// Upper bound on every remote call the store makes. Expiry is reported
  /// as [`Error::Timeout`](crate::Error::Timeout) and handled like any
  /// other remote failure.
  #[serde(with = "secs")]
  pub remote_timeout: Duration,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      remote_timeout: DEFAULT_REMOTE_TIMEOUT,
    }
  }
}

impl StoreConfig {
  pub fn with_timeout(remote_timeout: Duration) -> Self { Self { remote_timeout } }
}

mod secs {
  use std::time::Duration;

  use serde::{Deserialize, Deserializer};

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_secs)
  }
}
