//! Dashboard state and key dispatcher.

use std::{
  collections::VecDeque,
  sync::Arc,
  time::{Duration, Instant},
};

use chrono::{DateTime, Local, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use dialtone_core::call::CallSummary;

use crate::client::ApiClient;

/// How often the call list is re-fetched without user input.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Number of active-call samples kept for the chart.
pub const HISTORY_LEN: usize = 20;

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level dashboard state.
pub struct App {
  /// Active calls as of the last successful fetch, oldest first.
  pub calls: Vec<CallSummary>,

  /// Active-call count reported by the server.
  pub count: usize,

  /// Admission limit shown next to the count.
  pub limit: usize,

  /// The last [`HISTORY_LEN`] active-call counts, oldest first.
  pub history: VecDeque<u64>,

  /// Current fuzzy-filter string.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* call list.
  pub list_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Wall-clock time of the last successful fetch.
  pub last_updated: Option<DateTime<Local>>,

  last_attempt: Option<Instant>,

  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient, limit: usize) -> Self {
    Self {
      calls: Vec::new(),
      count: 0,
      limit,
      history: VecDeque::with_capacity(HISTORY_LEN),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      status_msg: String::new(),
      last_updated: None,
      last_attempt: None,
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Whether [`REFRESH_INTERVAL`] has passed since the last fetch attempt.
  pub fn refresh_due(&self) -> bool {
    self
      .last_attempt
      .is_none_or(|at| at.elapsed() >= REFRESH_INTERVAL)
  }

  /// Re-fetch calls and count. A failure is shown in the status bar and the
  /// previous data is kept on screen.
  pub async fn refresh(&mut self) {
    self.last_attempt = Some(Instant::now());
    let fetched =
      tokio::try_join!(self.client.list_calls(), self.client.call_count());
    match fetched {
      Ok((calls, count)) => {
        self.apply(calls, count);
        self.last_updated = Some(Local::now());
        self.status_msg.clear();
      }
      Err(e) => {
        tracing::debug!(error = %e, "refresh failed");
        self.status_msg = format!("Error: {e:#}");
      }
    }
  }

  /// Replace the call list and record the count, keeping the cursor on the
  /// same call if it is still active.
  pub fn apply(&mut self, calls: Vec<CallSummary>, count: usize) {
    let selected = self.cursor_call().map(|c| c.record.call_id.clone());
    self.calls = calls;
    self.count = count;
    self.history.push_back(count as u64);
    while self.history.len() > HISTORY_LEN {
      self.history.pop_front();
    }

    let filtered = self.filtered_calls();
    let cursor = selected
      .and_then(|id| filtered.iter().position(|c| c.record.call_id == id))
      .unwrap_or(self.list_cursor.min(filtered.len().saturating_sub(1)));
    self.list_cursor = cursor;
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Calls whose caller, callee or id fuzzy-match the filter.
  pub fn filtered_calls(&self) -> Vec<&CallSummary> {
    if self.filter.is_empty() {
      return self.calls.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .calls
      .iter()
      .filter(|c| {
        [
          &c.record.from_address,
          &c.record.to_address,
          &c.record.call_id,
        ]
        .iter()
        .any(|field| matcher.fuzzy_match(field, &self.filter).is_some())
      })
      .collect()
  }

  /// The call under the list cursor in the filtered view, if any.
  pub fn cursor_call(&self) -> Option<&CallSummary> {
    self.filtered_calls().get(self.list_cursor).copied()
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && key.code == KeyCode::Char('c')
    {
      return false;
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return true;
    }

    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_calls().len();
        if self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Char('r') => self.refresh().await,

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Esc => {
        self.filter.clear();
        self.list_cursor = 0;
      }

      _ => {}
    }
    true
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => return,
    }
    self.list_cursor = 0;
  }
}

/// Time since `call` started, as `m:ss` or `h:mm:ss`.
pub fn elapsed(call: &CallSummary, now: DateTime<Utc>) -> String {
  let secs = (now - call.record.start_time).num_seconds().max(0);
  let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
  if h > 0 {
    format!("{h}:{m:02}:{s:02}")
  } else {
    format!("{m}:{s:02}")
  }
}
