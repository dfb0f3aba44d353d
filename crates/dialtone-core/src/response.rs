//! The semantic kinds of response Dialtone sends back to the carrier.
//!
//! Rendering them into markup is `dialtone-twiml`'s job.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

use crate::call::IvrSelection;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseKind {
  /// Greeting followed by the two-option menu.
  Welcome,
  /// Looped music playback.
  Music,
  /// Repeated beep-and-pause sequence.
  Beep,
  /// "Not a valid option", then one more chance at the menu.
  Invalid,
  /// Generic spoken error, then hang up.
  Error,
  /// All lines busy, then hang up.
  Busy,
}

impl From<IvrSelection> for ResponseKind {
  fn from(selection: IvrSelection) -> Self {
    match selection {
      IvrSelection::Music => Self::Music,
      IvrSelection::Beep => Self::Beep,
    }
  }
}
