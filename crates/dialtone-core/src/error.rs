//! Error types for `dialtone-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown call status: {0:?}")]
  UnknownCallStatus(String),

  #[error("invalid menu selection: {0:?}")]
  InvalidSelection(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
