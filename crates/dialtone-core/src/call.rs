//! Call types: the record tracked per inbound call, and the carrier's
//! vocabulary for menu selections and call status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

// ─── Menu selection ──────────────────────────────────────────────────────────

/// What the caller picked from the IVR menu.
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
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IvrSelection {
  /// Option 1: a looped music track.
  Music,
  /// Option 2: a beep every few seconds.
  Beep,
}

impl IvrSelection {
  /// Map the DTMF digits gathered by the menu to a selection.
  pub fn from_digits(digits: &str) -> Result<Self> {
    match digits.trim() {
      "1" => Ok(Self::Music),
      "2" => Ok(Self::Beep),
      other => Err(Error::InvalidSelection(other.to_string())),
    }
  }
}

// ─── Call status ─────────────────────────────────────────────────────────────

/// The `CallStatus` value the carrier posts to the status callback.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CallStatus {
  Queued,
  Ringing,
  InProgress,
  Completed,
  Busy,
  Failed,
  Canceled,
  NoAnswer,
}

impl CallStatus {
  /// Parse the carrier's wire string, e.g. `"no-answer"`.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .parse()
      .map_err(|_| Error::UnknownCallStatus(s.to_string()))
  }

  /// Whether the call will not progress any further.
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      Self::Completed
        | Self::Busy
        | Self::Failed
        | Self::Canceled
        | Self::NoAnswer
    )
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// Lifecycle state of one inbound call.
///
/// Records held by a registry are always active and never carry an
/// `end_time`. The copy handed back on termination is the only place an
/// ended record appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
  /// Carrier-assigned identifier; unique among tracked calls.
  pub call_id:       String,
  pub from_address:  String,
  pub to_address:    String,
  pub ivr_selection: Option<IvrSelection>,
  pub start_time:    DateTime<Utc>,
  pub end_time:      Option<DateTime<Utc>>,
  pub active:        bool,
}

impl CallRecord {
  /// A freshly started call with no menu selection.
  pub fn new(
    call_id: impl Into<String>,
    from_address: impl Into<String>,
    to_address: impl Into<String>,
    start_time: DateTime<Utc>,
  ) -> Self {
    Self {
      call_id: call_id.into(),
      from_address: from_address.into(),
      to_address: to_address.into(),
      ivr_selection: None,
      start_time,
      end_time: None,
      active: true,
    }
  }

  /// Consume an active record and mark it ended at `at`.
  pub fn end(mut self, at: DateTime<Utc>) -> Self {
    self.active = false;
    self.end_time = Some(at);
    self
  }
}

// ─── Dashboard view ──────────────────────────────────────────────────────────

/// A record as shown on the dashboard: the record plus elapsed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSummary {
  #[serde(flatten)]
  pub record:        CallRecord,
  /// Seconds since `start_time` for active calls; `None` once ended.
  pub duration_secs: Option<f64>,
}

impl CallSummary {
  pub fn at(record: CallRecord, now: DateTime<Utc>) -> Self {
    let duration_secs = record.active.then(|| {
      (now - record.start_time).num_milliseconds().max(0) as f64 / 1000.0
    });
    Self {
      record,
      duration_secs,
    }
  }
}
