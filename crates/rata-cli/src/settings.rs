//! Layered settings: defaults, then the TOML file, then `RATA_*`
//! environment variables, then command-line flags.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context, Result, bail};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use rata_client::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use rata_store::StoreConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// Base URL of the RataTutor server.
  pub url:          String,
  /// API token, sent as a bearer token.
  pub token:        Option<String>,
  /// Bound on every request, in seconds.
  pub timeout_secs: u64,
}

impl Settings {
  /// Defaults plus the config file (if any) plus the environment. Flags are
  /// layered on top by the caller with `set_override_option`.
  pub fn layered(file: Option<&Path>, required: bool) -> Result<ConfigBuilder<DefaultState>> {
    let mut builder = Config::builder()
      .set_default("url", DEFAULT_BASE_URL)?
      .set_default("timeout_secs", DEFAULT_TIMEOUT.as_secs())?;
    if let Some(path) = file {
      builder = builder.add_source(File::from(path).required(required));
    }
    Ok(builder.add_source(Environment::with_prefix("RATA").try_parsing(true)))
  }

  pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
    let settings: Self = builder
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise settings")?;
    if settings.timeout_secs == 0 {
      bail!("timeout_secs must be at least 1");
    }
    Ok(settings)
  }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      base_url: self.url.clone(),
      token:    self.token.clone().filter(|t| !t.is_empty()),
      timeout:  self.timeout(),
    }
  }

  /// The store's bound matches the HTTP client's, so whichever fires first
  /// reports the same failure.
  pub fn store_config(&self) -> StoreConfig { StoreConfig::with_timeout(self.timeout()) }
}

/// `~/.config/rata/config.toml`, if `$HOME` is set.
pub fn default_path() -> Option<PathBuf> {
  std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/rata/config.toml"))
}
