pub mod incoming;
pub mod ivr;
pub mod status;

use dialtone_core::response::ResponseKind;

use crate::{Twiml, error::Result};

/// Fetch a required form field, trimmed. A blank value counts as absent.
pub(super) fn required<'a>(
  value: &'a Option<String>,
  name: &str,
) -> Result<&'a str> {
  match value.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v),
    _ => Err(crate::Error::Malformed(format!("missing {name}"))),
  }
}

pub(super) fn respond(
  kind: ResponseKind,
  config: &dialtone_twiml::TwimlConfig,
) -> Result<Twiml> {
  Ok(Twiml(dialtone_twiml::render(kind, config)?))
}
