//! Carrier-facing HTTP layer for Dialtone.
//!
//! Exposes an axum [`Router`] that answers the carrier's voice webhooks with
//! TwiML, backed by any [`CallRegistry`]. The dashboard read API is nested
//! under `/api` and the audio files the TwiML points at are served from
//! `/static`.

pub mod error;
pub mod handlers;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{
  Router,
  http::header,
  response::{IntoResponse, Response},
  routing::{get, post},
};
use dialtone_core::{credentials::Credentials, registry::CallRegistry};
use dialtone_twiml::TwimlConfig;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `dialtone.toml` and
/// `DIALTONE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  /// Public URL the carrier reaches this server at. Falls back to the
  /// `BASE_URL` variable, then to localhost.
  pub base_url:         Option<String>,
  pub max_active_calls: usize,
  pub static_dir:       PathBuf,
  /// Carrier credentials written by `dialtone setup`. Environment variables
  /// take precedence.
  pub twilio:           Option<Credentials>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "0.0.0.0".to_string(),
      port:             5000,
      base_url:         None,
      max_active_calls: 20,
      static_dir:       PathBuf::from("static"),
      twilio:           None,
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `DIALTONE_*` variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let mut cfg: Self = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("DIALTONE"))
      .build()?
      .try_deserialize()?;

    if cfg.base_url.is_none() {
      cfg.base_url = std::env::var("BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    }
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn public_url(&self) -> String {
    match &self.base_url {
      Some(url) => url.trim_end_matches('/').to_string(),
      None => format!("http://localhost:{}", self.port),
    }
  }

  pub fn twiml(&self) -> TwimlConfig {
    TwimlConfig::with_base_url(self.public_url())
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<R: CallRegistry> {
  pub registry: Arc<R>,
  pub config:   Arc<ServerConfig>,
  pub twiml:    Arc<TwimlConfig>,
}

impl<R: CallRegistry> AppState<R> {
  pub fn new(registry: R, config: ServerConfig) -> Self {
    Self {
      registry: Arc::new(registry),
      twiml:    Arc::new(config.twiml()),
      config:   Arc::new(config),
    }
  }
}

// ─── Responses ────────────────────────────────────────────────────────────────

/// A rendered TwiML document, sent as `text/xml`.
#[derive(Debug)]
pub struct Twiml(pub String);

impl IntoResponse for Twiml {
  fn into_response(self) -> Response {
    ([(header::CONTENT_TYPE, dialtone_twiml::CONTENT_TYPE)], self.0)
      .into_response()
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full server router: webhooks, health check, read API and
/// static audio.
pub fn router<R>(state: AppState<R>) -> Router
where
  R: CallRegistry + Clone + 'static,
{
  let api = dialtone_api::api_router(state.registry.clone());
  let audio = ServeDir::new(&state.config.static_dir);

  Router::new()
    .route("/incoming_call", post(handlers::incoming::handler::<R>))
    .route("/handle_ivr",    post(handlers::ivr::handler::<R>))
    .route("/call_status",   post(handlers::status::handler::<R>))
    .route("/health",        get(health))
    .with_state(state)
    .nest("/api", api)
    .nest_service("/static", audio)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use dialtone_core::call::IvrSelection;
  use dialtone_registry::InMemoryRegistry;
  use tower::ServiceExt as _;

  use crate::handlers::status::Ack;

  const FORM: &str = "application/x-www-form-urlencoded";
  const BUSY: &str = "all lines are currently busy";
  const ERROR: &str = "encountered an error";

  fn make_state() -> AppState<InMemoryRegistry> {
    AppState::new(InMemoryRegistry::new(), ServerConfig {
      base_url: Some("https://dialtone.test".to_string()),
      ..ServerConfig::default()
    })
  }

  async fn send(
    state: &AppState<InMemoryRegistry>,
    req: Request<Body>,
  ) -> (StatusCode, Option<String>, String) {
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let ct = resp
      .headers()
      .get(header::CONTENT_TYPE)
      .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, ct, String::from_utf8(bytes.to_vec()).unwrap())
  }

  async fn post_form(
    state: &AppState<InMemoryRegistry>,
    uri: &str,
    body: &str,
  ) -> (StatusCode, Option<String>, String) {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, FORM)
      .body(Body::from(body.to_string()))
      .unwrap();
    send(state, req).await
  }

  async fn start_call(state: &AppState<InMemoryRegistry>, sid: &str) -> String {
    let body = format!("CallSid={sid}&From=%2B15550001&To=%2B15550100");
    post_form(state, "/incoming_call", &body).await.2
  }

  // ── Incoming call ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn incoming_call_registers_and_greets() {
    let state = make_state();
    let (status, ct, body) = post_form(
      &state,
      "/incoming_call",
      "CallSid=CA1&From=%2B15550001&To=%2B15550100&AccountSid=AC9",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ct.as_deref(), Some("text/xml"));
    assert!(body.contains("<Gather"), "{body}");
    assert!(body.contains(r#"action="/handle_ivr""#), "{body}");

    let record = state.registry.get("CA1").unwrap();
    assert_eq!(record.from_address, "+15550001");
    assert_eq!(record.to_address, "+15550100");
    assert!(record.active);
  }

  #[tokio::test]
  async fn incoming_call_defaults_missing_addresses() {
    let state = make_state();
    post_form(&state, "/incoming_call", "CallSid=CA1").await;
    let record = state.registry.get("CA1").unwrap();
    assert_eq!(record.from_address, "unknown");
    assert_eq!(record.to_address, "unknown");
  }

  #[tokio::test]
  async fn repeated_start_is_idempotent() {
    let state = make_state();
    start_call(&state, "CA1").await;
    let body = start_call(&state, "CA1").await;
    assert!(body.contains("<Gather"), "{body}");
    assert_eq!(state.registry.count_active(), 1);
  }

  #[tokio::test]
  async fn missing_call_sid_gets_error_twiml() {
    let state = make_state();
    let (status, ct, body) =
      post_form(&state, "/incoming_call", "From=%2B15550001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ct.as_deref(), Some("text/xml"));
    assert!(body.contains(ERROR), "{body}");
    assert!(body.contains("<Hangup/>"), "{body}");
    assert_eq!(state.registry.count_active(), 0);
  }

  #[tokio::test]
  async fn unparseable_form_gets_error_twiml() {
    let state = make_state();
    let req = Request::builder()
      .method("POST")
      .uri("/incoming_call")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(r#"{"CallSid":"CA1"}"#))
      .unwrap();
    let (status, ct, body) = send(&state, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ct.as_deref(), Some("text/xml"));
    assert!(body.contains(ERROR), "{body}");
    assert_eq!(state.registry.count_active(), 0);
  }

  #[tokio::test]
  async fn twenty_first_call_is_busy() {
    let state = make_state();
    for i in 0..20 {
      let body = start_call(&state, &format!("CA{i}")).await;
      assert!(body.contains("<Gather"), "call {i}: {body}");
    }
    assert_eq!(state.registry.count_active(), 20);

    let body = start_call(&state, "CA20").await;
    assert!(body.contains(BUSY), "{body}");
    assert!(body.contains("<Hangup/>"), "{body}");
    assert_eq!(state.registry.count_active(), 20);
    assert!(state.registry.get("CA20").is_none());

    // Freeing a line lets the next caller in.
    post_form(&state, "/call_status", "CallSid=CA0&CallStatus=completed").await;
    let body = start_call(&state, "CA20").await;
    assert!(body.contains("<Gather"), "{body}");
    assert_eq!(state.registry.count_active(), 20);
  }

  #[tokio::test]
  async fn tracked_caller_redialling_at_capacity_is_greeted() {
    let state = make_state();
    for i in 0..20 {
      start_call(&state, &format!("CA{i}")).await;
    }
    let body = start_call(&state, "CA7").await;
    assert!(body.contains("<Gather"), "{body}");
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_starts_never_exceed_limit() {
    let state = make_state();
    let mut tasks = Vec::new();
    for i in 0..40 {
      let state = state.clone();
      tasks.push(tokio::spawn(async move {
        start_call(&state, &format!("CA{i}")).await
      }));
    }

    let mut busy = 0;
    for task in tasks {
      if task.await.unwrap().contains(BUSY) {
        busy += 1;
      }
    }
    assert_eq!(busy, 20);
    assert_eq!(state.registry.count_active(), 20);
  }

  // ── IVR ──────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn digit_one_plays_music() {
    let state = make_state();
    start_call(&state, "CA1").await;
    let (_, ct, body) =
      post_form(&state, "/handle_ivr", "Digits=1&CallSid=CA1").await;

    assert_eq!(ct.as_deref(), Some("text/xml"));
    assert!(
      body.contains("https://dialtone.test/static/audio/music.mp3"),
      "{body}"
    );
    assert_eq!(
      state.registry.get("CA1").unwrap().ivr_selection,
      Some(IvrSelection::Music)
    );
  }

  #[tokio::test]
  async fn digit_two_plays_beeps() {
    let state = make_state();
    start_call(&state, "CA1").await;
    let (_, _, body) =
      post_form(&state, "/handle_ivr", "Digits=2&CallSid=CA1").await;

    assert_eq!(body.matches("beep.mp3").count(), 20, "{body}");
    assert_eq!(
      state.registry.get("CA1").unwrap().ivr_selection,
      Some(IvrSelection::Beep)
    );
  }

  #[tokio::test]
  async fn other_digits_repeat_the_menu() {
    let state = make_state();
    start_call(&state, "CA1").await;
    for digits in ["9", "", "12"] {
      let body = format!("Digits={digits}&CallSid=CA1");
      let (_, _, xml) = post_form(&state, "/handle_ivr", &body).await;
      assert!(xml.contains("not a valid option"), "{digits:?}: {xml}");
      assert!(xml.contains("<Gather"), "{digits:?}: {xml}");
    }
    assert_eq!(state.registry.get("CA1").unwrap().ivr_selection, None);
  }

  #[tokio::test]
  async fn selection_for_untracked_call_still_answers() {
    let state = make_state();
    let (status, _, body) =
      post_form(&state, "/handle_ivr", "Digits=1&CallSid=CA404").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("music.mp3"), "{body}");
    assert!(state.registry.get("CA404").is_none());
  }

  // ── Status callback ──────────────────────────────────────────────────────────

  async fn post_status(
    state: &AppState<InMemoryRegistry>,
    body: &str,
  ) -> Ack {
    let (status, ct, json) = post_form(state, "/call_status", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ct.as_deref(), Some("application/json"));
    serde_json::from_str(&json).unwrap()
  }

  #[tokio::test]
  async fn terminal_statuses_end_the_call() {
    for terminal in ["completed", "busy", "failed", "canceled", "no-answer"] {
      let state = make_state();
      start_call(&state, "CA1").await;
      let ack = post_status(
        &state,
        &format!("CallSid=CA1&CallStatus={terminal}"),
      )
      .await;
      assert_eq!(ack.status, "success");
      assert_eq!(state.registry.count_active(), 0, "{terminal}");
    }
  }

  #[tokio::test]
  async fn non_terminal_and_unknown_statuses_are_ignored() {
    let state = make_state();
    start_call(&state, "CA1").await;
    for status in ["ringing", "in-progress", "queued", "exploded"] {
      let ack =
        post_status(&state, &format!("CallSid=CA1&CallStatus={status}")).await;
      assert_eq!(ack.status, "success");
    }
    assert!(state.registry.get("CA1").is_some());
  }

  #[tokio::test]
  async fn ending_an_untracked_call_succeeds() {
    let state = make_state();
    let ack = post_status(&state, "CallSid=CA404&CallStatus=completed").await;
    assert_eq!(ack.status, "success");
  }

  #[tokio::test]
  async fn status_without_call_sid_reports_error() {
    let state = make_state();
    let ack = post_status(&state, "CallStatus=completed").await;
    assert_eq!(ack.status, "error");
    assert!(ack.message.unwrap().contains("CallSid"));
  }

  #[tokio::test]
  async fn blank_call_sid_is_rejected_and_padding_is_trimmed() {
    let state = make_state();
    start_call(&state, "CA1").await;

    let ack =
      post_status(&state, "CallSid=%20%20&CallStatus=completed").await;
    assert_eq!(ack.status, "error");
    assert!(ack.message.unwrap().contains("CallSid"));
    assert_eq!(state.registry.count_active(), 1);

    let ack =
      post_status(&state, "CallSid=%20CA1%20&CallStatus=completed").await;
    assert_eq!(ack.status, "success");
    assert_eq!(state.registry.count_active(), 0);
  }

  #[tokio::test]
  async fn selection_after_hangup_is_not_recorded() {
    let state = make_state();
    start_call(&state, "CA1").await;
    post_status(&state, "CallSid=CA1&CallStatus=completed").await;
    post_form(&state, "/handle_ivr", "Digits=2&CallSid=CA1").await;
    assert!(state.registry.get("CA1").is_none());
    assert_eq!(state.registry.count_active(), 0);
  }

  // ── Misc routes ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_check() {
    let state = make_state();
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, _, body) = send(&state, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
  }

  #[tokio::test]
  async fn api_is_nested() {
    let state = make_state();
    start_call(&state, "CA1").await;
    start_call(&state, "CA2").await;
    let req = Request::builder()
      .uri("/api/call_count")
      .body(Body::empty())
      .unwrap();
    let (status, _, body) = send(&state, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"count":2}"#);
  }

  #[tokio::test]
  async fn serves_audio_from_static_dir() {
    let dir = std::env::temp_dir()
      .join(format!("dialtone-static-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("audio")).unwrap();
    std::fs::write(dir.join("audio/beep.mp3"), b"beep").unwrap();

    let state = AppState::new(InMemoryRegistry::new(), ServerConfig {
      static_dir: dir.clone(),
      ..ServerConfig::default()
    });
    let req = Request::builder()
      .uri("/static/audio/beep.mp3")
      .body(Body::empty())
      .unwrap();
    let (status, _, body) = send(&state, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "beep");

    std::fs::remove_dir_all(dir).ok();
  }

  // ── Configuration ────────────────────────────────────────────────────────────

  #[test]
  fn public_url_prefers_configured_value() {
    let cfg = ServerConfig {
      base_url: Some("https://abc.ngrok.test/".to_string()),
      ..ServerConfig::default()
    };
    assert_eq!(cfg.public_url(), "https://abc.ngrok.test");
    assert_eq!(
      cfg.twiml().base_url,
      "https://abc.ngrok.test"
    );

    let cfg = ServerConfig { port: 8080, ..ServerConfig::default() };
    assert_eq!(cfg.public_url(), "http://localhost:8080");
    assert_eq!(cfg.address(), "0.0.0.0:8080");
  }

  #[test]
  fn load_reads_toml_over_defaults() {
    let path = std::env::temp_dir()
      .join(format!("dialtone-config-{}.toml", std::process::id()));
    std::fs::write(
      &path,
      "port = 6000\nmax_active_calls = 5\nbase_url = \"https://x.test\"\n\n\
       [twilio]\naccount_sid = \"AC123\"\n",
    )
    .unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 6000);
    assert_eq!(cfg.max_active_calls, 5);
    assert_eq!(cfg.base_url.as_deref(), Some("https://x.test"));
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.static_dir, PathBuf::from("static"));
    let twilio = cfg.twilio.unwrap();
    assert_eq!(twilio.account_sid.as_deref(), Some("AC123"));
    assert!(twilio.auth_token.is_none());

    std::fs::remove_file(path).ok();
  }
}
