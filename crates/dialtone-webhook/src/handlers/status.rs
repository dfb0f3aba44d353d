//! `POST /call_status`: the carrier's lifecycle callbacks.
//!
//! Only terminal statuses matter; everything else is acknowledged and
//! dropped.

use axum::{
  Json,
  extract::{Form, State, rejection::FormRejection},
};
use dialtone_core::{call::CallStatus, registry::CallRegistry};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::handlers::required;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusCallback {
  pub call_sid:    Option<String>,
  #[serde(default)]
  pub call_status: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
  pub status:  String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl Ack {
  fn success() -> Self {
    Self { status: "success".to_string(), message: None }
  }

  fn error(message: impl Into<String>) -> Self {
    Self { status: "error".to_string(), message: Some(message.into()) }
  }
}

pub async fn handler<R>(
  State(state): State<crate::AppState<R>>,
  form: Result<Form<StatusCallback>, FormRejection>,
) -> Json<Ack>
where
  R: CallRegistry + Clone + 'static,
{
  let update = match form {
    Ok(Form(update)) => update,
    Err(rejection) => {
      warn!(error = %rejection.body_text(), "unreadable status callback");
      return Json(Ack::error(rejection.body_text()));
    }
  };
  let call_id = match required(&update.call_sid, "CallSid") {
    Ok(call_id) => call_id,
    Err(e) => {
      warn!(error = %e, "status callback without CallSid");
      return Json(Ack::error(e.to_string()));
    }
  };
  debug!(call_id, status = %update.call_status, "status callback");

  let status = match CallStatus::parse(&update.call_status) {
    Ok(status) => status,
    Err(e) => {
      debug!(call_id, error = %e, "ignoring status");
      return Json(Ack::success());
    }
  };

  if status.is_terminal() {
    match state.registry.terminate(call_id) {
      Some(record) => {
        debug!(call_id, %status, started = %record.start_time, "call released")
      }
      None => warn!(call_id, %status, "end of untracked call"),
    }
  }
  Json(Ack::success())
}
