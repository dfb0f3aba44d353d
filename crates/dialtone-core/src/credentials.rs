//! Carrier credential discovery.
//!
//! Deployments name the account SID and auth token inconsistently, so each is
//! looked up under several variable names and the first one set wins. The
//! lookup is injected so callers can read from somewhere other than the
//! process environment.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const ACCOUNT_SID_VARS: [&str; 3] =
  ["TWILIO_ACCOUNT_SID", "TWILIO_SID", "TWILIO_ACCT_SID"];
pub const AUTH_TOKEN_VARS: [&str; 3] =
  ["TWILIO_AUTH_TOKEN", "TWILIO_TOKEN", "TWILIO_AUTH"];
pub const PHONE_NUMBER_VAR: &str = "TWILIO_PHONE_NUMBER";

/// Carrier account credentials. Any field may be missing.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
  pub account_sid:  Option<String>,
  pub auth_token:   Option<String>,
  pub phone_number: Option<String>,
}

impl Credentials {
  /// Discover credentials from the process environment.
  pub fn from_env() -> Self { Self::discover(|name| std::env::var(name).ok()) }

  /// Discover credentials through `lookup`, logging which variable supplied
  /// each value and warning about whatever is missing.
  pub fn discover(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let account_sid = first_set(&ACCOUNT_SID_VARS, &lookup);
    let auth_token = first_set(&AUTH_TOKEN_VARS, &lookup);

    match &account_sid {
      Some((var, _)) => info!(var, "found account SID"),
      None => warn!(searched = ?ACCOUNT_SID_VARS, "account SID not set"),
    }
    match &auth_token {
      Some((var, _)) => info!(var, "found auth token"),
      None => warn!(searched = ?AUTH_TOKEN_VARS, "auth token not set"),
    }

    Self {
      account_sid:  account_sid.map(|(_, v)| v),
      auth_token:   auth_token.map(|(_, v)| v),
      phone_number: lookup(PHONE_NUMBER_VAR).filter(|v| !v.trim().is_empty()),
    }
  }

  /// Fill any field missing here from `fallback`.
  pub fn or(self, fallback: Self) -> Self {
    Self {
      account_sid:  self.account_sid.or(fallback.account_sid),
      auth_token:   self.auth_token.or(fallback.auth_token),
      phone_number: self.phone_number.or(fallback.phone_number),
    }
  }

  /// Both the account SID and the auth token are present.
  pub fn is_complete(&self) -> bool {
    self.account_sid.is_some() && self.auth_token.is_some()
  }

  pub fn masked_sid(&self) -> Option<String> {
    self.account_sid.as_deref().map(|s| mask(s, 5))
  }

  pub fn masked_token(&self) -> Option<String> {
    self.auth_token.as_deref().map(|s| mask(s, 3))
  }
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("account_sid", &self.masked_sid())
      .field("auth_token", &self.masked_token())
      .field("phone_number", &self.phone_number)
      .finish()
  }
}

fn first_set(
  names: &[&'static str],
  lookup: &impl Fn(&str) -> Option<String>,
) -> Option<(&'static str, String)> {
  names.iter().find_map(|&name| {
    lookup(name)
      .filter(|v| !v.trim().is_empty())
      .map(|v| (name, v))
  })
}

/// Show the first and last `keep` characters of `secret`, or `***` when it
/// is too short to reveal anything safely.
pub fn mask(secret: &str, keep: usize) -> String {
  let chars: Vec<char> = secret.chars().collect();
  if chars.len() <= keep * 2 {
    return "***".to_string();
  }
  let head: String = chars[..keep].iter().collect();
  let tail: String = chars[chars.len() - keep..].iter().collect();
  format!("{head}...{tail}")
}
