//! Error type for `rata-store`.

use std::time::Duration;

use rata_core::{MaterialId, MaterialStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Core(#[from] rata_core::Error),

  /// The remote rejected the call. `source` is the transport's own error.
  #[error("{op} failed: {source}")]
  Remote {
    op:     &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("{op} timed out after {after:?}")]
  Timeout { op: &'static str, after: Duration },

  #[error("material {id} is {actual}, expected {expected}")]
  InvalidStatus {
    id:       MaterialId,
    expected: MaterialStatus,
    actual:   MaterialStatus,
  },

  /// Every permanent deletion in a bulk request failed.
  #[error("all {} permanent deletions failed", failed.len())]
  BulkFailed { failed: Vec<(MaterialId, String)> },
}

impl Error {
  /// The transport error behind a [`Error::Remote`], if that is what this is.
  pub fn remote_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
    match self {
      Self::Remote { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
