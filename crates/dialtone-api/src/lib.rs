//! JSON read API for the Dialtone dashboard.
//!
//! Exposes an axum [`Router`] backed by any
//! [`dialtone_core::registry::CallRegistry`]. Transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", dialtone_api::api_router(registry.clone()))
//! ```

pub mod calls;
pub mod error;
pub mod stream;

use std::sync::Arc;

use axum::{Router, routing::get};
use dialtone_core::registry::CallRegistry;

pub use error::ApiError;

/// Build the read-only API router for `registry`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<R>(registry: Arc<R>) -> Router<()>
where
  R: CallRegistry + 'static,
{
  Router::new()
    .route("/calls", get(calls::list::<R>))
    .route("/calls/{id}", get(calls::get_one::<R>))
    .route("/call_count", get(calls::count::<R>))
    .route("/stream", get(stream::handler::<R>))
    .with_state(registry)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use dialtone_core::{
    call::{CallSummary, IvrSelection},
    registry::CallRegistry,
  };
  use dialtone_registry::InMemoryRegistry;
  use futures::StreamExt as _;
  use tower::ServiceExt as _;

  use super::*;

  async fn get_json<T: serde::de::DeserializeOwned>(
    registry: &Arc<InMemoryRegistry>,
    uri: &str,
  ) -> (StatusCode, T) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = api_router(registry.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn empty_registry_lists_nothing() {
    let registry = Arc::new(InMemoryRegistry::new());
    let (status, calls): (_, Vec<CallSummary>) =
      get_json(&registry, "/calls").await;
    assert_eq!(status, StatusCode::OK);
    assert!(calls.is_empty());
  }

  #[tokio::test]
  async fn lists_active_calls_with_duration() {
    let registry = Arc::new(InMemoryRegistry::new());
    registry.register("CA1", "+15550001", "+15550100");
    registry.register("CA2", "+15550002", "+15550100");
    registry.set_selection("CA2", IvrSelection::Beep);

    let (_, calls): (_, Vec<CallSummary>) =
      get_json(&registry, "/calls").await;
    assert_eq!(calls.len(), 2);
    let ca2 = calls.iter().find(|c| c.record.call_id == "CA2").unwrap();
    assert_eq!(ca2.record.ivr_selection, Some(IvrSelection::Beep));
    assert!(calls.iter().all(|c| c.duration_secs.is_some()));
  }

  #[tokio::test]
  async fn count_reflects_registry() {
    let registry = Arc::new(InMemoryRegistry::new());
    registry.register("CA1", "a", "b");
    registry.register("CA2", "a", "b");
    registry.terminate("CA1");

    let (status, body): (_, calls::CountBody) =
      get_json(&registry, "/call_count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.count, 1);
  }

  #[tokio::test]
  async fn get_one_404_after_termination() {
    let registry = Arc::new(InMemoryRegistry::new());
    registry.register("CA1", "a", "b");

    let (status, call): (_, CallSummary) =
      get_json(&registry, "/calls/CA1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(call.record.call_id, "CA1");

    registry.terminate("CA1");
    let (status, body): (_, serde_json::Value) =
      get_json(&registry, "/calls/CA1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("CA1"));
  }

  #[tokio::test]
  async fn stream_sends_initial_snapshot() {
    let registry = Arc::new(InMemoryRegistry::new());
    registry.register("CA1", "a", "b");
    registry.register("CA2", "a", "b");

    let req = Request::builder()
      .uri("/stream")
      .body(Body::empty())
      .unwrap();
    let resp = api_router(registry).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap();
    assert_eq!(ct, "text/event-stream");

    let mut body = resp.into_body().into_data_stream();
    let frame = body.next().await.unwrap().unwrap();
    let frame = std::str::from_utf8(&frame).unwrap();
    assert!(frame.starts_with("data: "), "{frame}");
    assert!(frame.contains(r#""count":2"#), "{frame}");
  }
}
