//! Error types and axum `IntoResponse` implementation.
//!
//! Every webhook error is answered with the error TwiML and a `200`: the
//! carrier must always receive markup it can execute, never a raw fault.

use axum::{
  extract::rejection::FormRejection,
  response::{IntoResponse, Response},
};
use dialtone_core::response::ResponseKind;
use dialtone_twiml::{TwimlConfig, render_or_fallback};
use thiserror::Error;

use crate::Twiml;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed request: {0}")]
  Malformed(String),
  #[error("twiml error: {0}")]
  Twiml(#[from] dialtone_twiml::Error),
}

impl From<FormRejection> for Error {
  fn from(rejection: FormRejection) -> Self {
    Error::Malformed(rejection.body_text())
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    tracing::error!(error = %self, "webhook failed");
    // The error document has no audio, so the base URL is irrelevant here.
    Twiml(render_or_fallback(ResponseKind::Error, &TwimlConfig::default()))
      .into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
