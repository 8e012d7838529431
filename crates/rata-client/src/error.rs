//! Error type for the HTTP client.

use reqwest::{Method, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
  /// Transport failure: connection refused, request timeout, bad body.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The API answered with a non-2xx status.
  #[error("{method} {path} → {status}: {body}")]
  Status {
    method: Method,
    path:   String,
    status: StatusCode,
    body:   String,
  },

  #[error("failed to encode request body: {0}")]
  Encode(#[from] serde_json::Error),

  #[error("invalid client configuration: {0}")]
  Config(String),
}

impl ClientError {
  /// The HTTP status, if the server answered at all.
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::Status { status, .. } => Some(*status),
      Self::Http(e) => e.status(),
      _ => None,
    }
  }
}
