//! `POST /handle_ivr`: act on the digit the caller pressed.

use axum::extract::{Form, State, rejection::FormRejection};
use dialtone_core::{
  call::IvrSelection,
  registry::CallRegistry,
  response::ResponseKind,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
  AppState, Twiml,
  error::Result,
  handlers::{required, respond},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MenuInput {
  #[serde(default)]
  pub digits:   String,
  pub call_sid: Option<String>,
}

pub async fn handler<R>(
  State(state): State<AppState<R>>,
  form: Result<Form<MenuInput>, FormRejection>,
) -> Result<Twiml>
where
  R: CallRegistry + Clone + 'static,
{
  let Form(input) = form?;
  let call_id = required(&input.call_sid, "CallSid")?;
  debug!(call_id, digits = %input.digits, "menu input");

  let Ok(selection) = IvrSelection::from_digits(&input.digits) else {
    return respond(ResponseKind::Invalid, &state.twiml);
  };

  if state.registry.set_selection(call_id, selection).is_none() {
    warn!(call_id, %selection, "menu input for untracked call");
  }
  respond(selection.into(), &state.twiml)
}
