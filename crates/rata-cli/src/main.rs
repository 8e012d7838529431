//! `rata`: command-line client for RataTutor study materials.
//!
//! # Usage
//!
//! ```text
//! rata --url http://localhost:8000 --token <TOKEN> list --search biology
//! rata rm 42
//! rata purge 7 8 9
//! ```
//!
//! Settings come from `~/.config/rata/config.toml` (or `--config`), then
//! `RATA_URL`, `RATA_TOKEN` and `RATA_TIMEOUT_SECS`, then flags.

mod commands;
mod settings;
mod term;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use commands::Command;
use rata_client::HttpRemote;
use rata_store::{FetchOutcome, MaterialsStore};
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rata", version, about = "Manage RataTutor study materials")]
struct Args {
  /// Path to a TOML config file (url, token, timeout_secs).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the RataTutor server (default: http://localhost:8000).
  #[arg(long, global = true)]
  url: Option<String>,

  /// API token.
  #[arg(long, global = true)]
  token: Option<String>,

  /// Request timeout in seconds (default: 30).
  #[arg(long, value_name = "SECS", global = true)]
  timeout: Option<u64>,

  /// Log more; repeat for more detail. `RUST_LOG` takes precedence.
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let level = match args.verbose {
    0 => LevelFilter::WARN,
    1 => LevelFilter::INFO,
    2 => LevelFilter::DEBUG,
    _ => LevelFilter::TRACE,
  };
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy(),
    )
    .init();

  // An explicit --config must exist; the default path is optional.
  let (path, required) = match &args.config {
    Some(path) => (Some(path.clone()), true),
    None => (settings::default_path(), false),
  };
  let builder = Settings::layered(path.as_deref(), required)?
    .set_override_option("url", args.url.clone())?
    .set_override_option("token", args.token.clone())?
    .set_override_option("timeout_secs", args.timeout)?;
  let settings = Settings::from_builder(builder)?;
  tracing::debug!(url = %settings.url, timeout = settings.timeout_secs, "loaded settings");

  let remote = HttpRemote::new(settings.api_config()).context("failed to build HTTP client")?;
  let store = MaterialsStore::with_config(remote, settings.store_config());
  store
    .on_change(|change| tracing::info!(?change, "materials changed"))
    .detach();

  if store.ensure_initialized().await == Some(FetchOutcome::Failed) {
    let reason = store.snapshot().error.clone().unwrap_or_default();
    bail!("could not load materials from {}: {reason}", settings.url);
  }

  commands::run(&store, args.command, &term::Stderr).await
}
