//! `POST /incoming_call`: admit a new call and greet it, or turn it away.

use axum::extract::{Form, State, rejection::FormRejection};
use dialtone_core::{
  registry::{Admission, CallRegistry},
  response::ResponseKind,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
  AppState, Twiml,
  error::Result,
  handlers::{required, respond},
};

const UNKNOWN: &str = "unknown";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IncomingCall {
  pub call_sid: Option<String>,
  pub from:     Option<String>,
  pub to:       Option<String>,
}

pub async fn handler<R>(
  State(state): State<AppState<R>>,
  form: Result<Form<IncomingCall>, FormRejection>,
) -> Result<Twiml>
where
  R: CallRegistry + Clone + 'static,
{
  let Form(call) = form?;
  let call_id = required(&call.call_sid, "CallSid")?;
  let from = call.from.as_deref().unwrap_or(UNKNOWN);
  let to = call.to.as_deref().unwrap_or(UNKNOWN);
  debug!(call_id, from, to, "incoming call");

  let limit = state.config.max_active_calls;
  match state.registry.try_register(call_id, from, to, limit) {
    Admission::Accepted(_) | Admission::Duplicate(_) => {
      respond(ResponseKind::Welcome, &state.twiml)
    }
    Admission::Rejected { active } => {
      warn!(call_id, from, active, limit, "line limit reached, rejecting call");
      respond(ResponseKind::Busy, &state.twiml)
    }
  }
}
