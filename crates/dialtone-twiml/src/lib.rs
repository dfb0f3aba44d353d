//! TwiML writer for Dialtone.
//!
//! Turns a [`ResponseKind`] into the XML document the carrier executes next.
//! Pure synchronous; no HTTP dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use dialtone_core::response::ResponseKind;
//! use dialtone_twiml::{TwimlConfig, render};
//!
//! let config = TwimlConfig::with_base_url("https://example.test");
//! let xml = render(ResponseKind::Welcome, &config).unwrap();
//! assert!(xml.contains("<Gather"));
//! ```

mod document;
pub mod error;

use dialtone_core::response::ResponseKind;

use document::Document;
pub use error::{Error, Result};

/// MIME type the carrier expects on every TwiML response.
pub const CONTENT_TYPE: &str = "text/xml";

/// Served when rendering itself fails, so the caller still hears something
/// and the call is released.
pub const FALLBACK_ERROR: &str = concat!(
  r#"<?xml version="1.0" encoding="UTF-8"?>"#,
  "<Response>",
  "<Say>We are sorry, but an error occurred while processing your call. ",
  "Please try again later.</Say>",
  "<Hangup/>",
  "</Response>",
);

const GREETING: &str = "Welcome to the telephony testing service.";
const MENU_PROMPT: &str =
  "Press 1 to listen to music. Press 2 to hear a beep every 3 seconds.";
const ERROR_MESSAGE: &str = "We're sorry, but we encountered an error \
                             processing your call. Please try again later.";
const BUSY_MESSAGE: &str = "We're sorry, but all lines are currently busy. \
                            The maximum number of simultaneous calls has \
                            been reached. Please try again later.";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Paths, audio locations and timing used when rendering responses.
#[derive(Debug, Clone)]
pub struct TwimlConfig {
  /// Public URL the carrier fetches audio from; no trailing slash needed.
  pub base_url:            String,
  /// `action` of the menu `<Gather>`.
  pub ivr_path:            String,
  /// Where `<Redirect>` sends a caller who didn't press anything.
  pub incoming_path:       String,
  pub gather_timeout_secs: u32,
  pub music_loops:         u32,
  pub beep_repetitions:    u32,
  pub beep_interval_secs:  u32,
}

impl Default for TwimlConfig {
  fn default() -> Self {
    Self {
      base_url:            "http://localhost:5000".to_string(),
      ivr_path:            "/handle_ivr".to_string(),
      incoming_path:       "/incoming_call".to_string(),
      gather_timeout_secs: 10,
      music_loops:         10,
      beep_repetitions:    20,
      beep_interval_secs:  3,
    }
  }
}

impl TwimlConfig {
  pub fn with_base_url(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      ..Self::default()
    }
  }

  fn audio_url(&self, file: &str) -> String {
    format!("{}/static/audio/{file}", self.base_url.trim_end_matches('/'))
  }
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Render `kind` as a complete TwiML document.
pub fn render(kind: ResponseKind, config: &TwimlConfig) -> Result<String> {
  let mut doc = Document::new()?;

  match kind {
    ResponseKind::Welcome => {
      doc
        .say(GREETING)?
        .pause(1)?
        .gather(&config.ivr_path, 1, config.gather_timeout_secs, MENU_PROMPT)?
        .redirect(&config.incoming_path)?;
    }
    ResponseKind::Music => {
      doc
        .say("Playing music now.")?
        .play(&config.audio_url("music.mp3"), config.music_loops)?;
    }
    ResponseKind::Beep => {
      doc.say(&format!(
        "Playing a beep every {} seconds.",
        config.beep_interval_secs
      ))?;
      let beep = config.audio_url("beep.mp3");
      for _ in 0..config.beep_repetitions {
        doc.play(&beep, 1)?.pause(config.beep_interval_secs)?;
      }
    }
    ResponseKind::Invalid => {
      doc
        .say("Sorry, that's not a valid option.")?
        .gather(&config.ivr_path, 1, config.gather_timeout_secs, MENU_PROMPT)?
        .say("No input received. Goodbye.")?
        .hangup()?;
    }
    ResponseKind::Error => {
      doc.say(ERROR_MESSAGE)?.hangup()?;
    }
    ResponseKind::Busy => {
      doc.say(BUSY_MESSAGE)?.hangup()?;
    }
  }

  doc.finish()
}

/// Like [`render`], but never fails: any error yields [`FALLBACK_ERROR`].
pub fn render_or_fallback(kind: ResponseKind, config: &TwimlConfig) -> String {
  render(kind, config).unwrap_or_else(|_| FALLBACK_ERROR.to_string())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
