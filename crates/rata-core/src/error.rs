//! Error types for `rata-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("a material patch must change at least one field")]
  EmptyPatch,

  #[error("title cannot be blank or just whitespace")]
  BlankTitle,

  #[error("{field} is longer than {max} characters")]
  TooLong { field: &'static str, max: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
