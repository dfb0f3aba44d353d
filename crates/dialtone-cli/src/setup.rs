//! `dialtone setup`: interactive wizard that writes carrier credentials and
//! the public base URL to a TOML file the server reads at startup.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use dialtone_core::credentials::{Credentials, mask};
use serde::{Deserialize, Serialize};

/// Shape of the file the wizard writes.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupFile {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub base_url: Option<String>,
  #[serde(default)]
  pub twilio:   Credentials,
}

impl SetupFile {
  /// The wizard's keys as found in an existing config file. Everything else
  /// in the file is ignored.
  pub fn from_table(table: &toml::Table) -> Self {
    table.clone().try_into().unwrap_or_default()
  }

  /// Write these settings into `table`, leaving every other key alone. A
  /// blank base URL keeps whatever the file already had.
  pub fn merge_into(&self, table: &mut toml::Table) -> Result<()> {
    if let Some(url) = &self.base_url {
      table.insert("base_url".to_string(), toml::Value::String(url.clone()));
    }
    let twilio =
      toml::Value::try_from(&self.twilio).context("serialising credentials")?;
    table.insert("twilio".to_string(), twilio);
    Ok(())
  }
}

/// Line-oriented prompt over any reader/writer pair.
pub struct Prompter<R, W> {
  input:  R,
  output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
  pub fn new(input: R, output: W) -> Self { Self { input, output } }

  pub fn say(&mut self, line: &str) -> Result<()> {
    writeln!(self.output, "{line}")?;
    Ok(())
  }

  /// Print `question` and read one trimmed line. End of input is an error.
  pub fn ask(&mut self, question: &str) -> Result<String> {
    write!(self.output, "{question} ")?;
    self.output.flush()?;
    let mut line = String::new();
    if self.input.read_line(&mut line)? == 0 {
      bail!("input closed");
    }
    Ok(line.trim().to_string())
  }

  /// Like [`ask`](Self::ask), but an empty answer is `None`.
  pub fn ask_optional(&mut self, question: &str) -> Result<Option<String>> {
    let answer = self.ask(question)?;
    Ok((!answer.is_empty()).then_some(answer))
  }

  /// Re-ask until the answer is non-empty.
  pub fn ask_required(&mut self, question: &str) -> Result<String> {
    loop {
      let answer = self.ask(question)?;
      if !answer.is_empty() {
        return Ok(answer);
      }
      self.say("A value is required.")?;
    }
  }

  /// `y` or `yes` (any case) confirms; anything else declines.
  pub fn confirm(&mut self, question: &str) -> Result<bool> {
    let answer = self.ask(&format!("{question} (yes/no)"))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
  }
}

/// Run the wizard. Returns `None` if the user declined at either prompt.
pub fn run<R: BufRead, W: Write>(
  prompt: &mut Prompter<R, W>,
  existing: &Credentials,
  existing_base_url: Option<&str>,
) -> Result<Option<SetupFile>> {
  prompt.say("=== Dialtone carrier setup ===")?;
  prompt.say("")?;

  match existing.masked_sid() {
    Some(sid) => prompt.say(&format!("Found existing account SID: {sid}"))?,
    None => prompt.say("No account SID configured.")?,
  }
  match existing.masked_token() {
    Some(token) => {
      prompt.say(&format!("Found existing auth token: {token}"))?
    }
    None => prompt.say("No auth token configured.")?,
  }
  match &existing.phone_number {
    Some(number) => {
      prompt.say(&format!("Found existing phone number: {number}"))?
    }
    None => prompt.say("No phone number configured.")?,
  }
  match existing_base_url {
    Some(url) => prompt.say(&format!("Found existing base URL: {url}"))?,
    None => prompt.say("No base URL configured.")?,
  }
  prompt.say("")?;

  if !prompt.confirm("Update these settings?")? {
    prompt.say("Setup canceled.")?;
    return Ok(None);
  }

  let account_sid = prompt.ask_required("Account SID:")?;
  let auth_token = prompt.ask_required("Auth token:")?;
  let phone_number =
    prompt.ask_optional("Phone number, e.g. +15551234567 (optional):")?;
  let base_url = prompt
    .ask_optional("Public base URL, e.g. https://abc.ngrok.app (optional):")?;

  prompt.say("")?;
  prompt.say("Please verify:")?;
  prompt.say(&format!("  Account SID:  {}", mask(&account_sid, 5)))?;
  prompt.say(&format!("  Auth token:   {}", mask(&auth_token, 3)))?;
  if let Some(number) = &phone_number {
    prompt.say(&format!("  Phone number: {number}"))?;
  }
  if let Some(url) = &base_url {
    prompt.say(&format!("  Base URL:     {url}"))?;
  }

  if !prompt.confirm("Save these settings?")? {
    prompt.say("Setup canceled.")?;
    return Ok(None);
  }

  Ok(Some(SetupFile {
    base_url,
    twilio: Credentials {
      account_sid: Some(account_sid),
      auth_token: Some(auth_token),
      phone_number,
    },
  }))
}
