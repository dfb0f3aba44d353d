//! Error types for the TwiML writer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("xml write error: {0}")]
  Xml(String),

  #[error("rendered document is not UTF-8: {0}")]
  Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
