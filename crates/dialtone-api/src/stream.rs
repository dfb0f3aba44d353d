//! Handler for `GET /stream`: server-sent events for the live dashboard.
//!
//! The registry is sampled once a second. An event is sent on the first tick
//! and afterwards only when the active-call count changes.

use std::{sync::Arc, time::Duration};

use axum::{
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use chrono::Utc;
use dialtone_core::{
  call::CallSummary,
  registry::{CallRegistry, RegistrySnapshot},
};
use futures::{Stream, stream};
use serde::{Deserialize, Serialize};
use tokio::time::{MissedTickBehavior, interval};

use crate::calls::summarize;

const SAMPLE_PERIOD: Duration = Duration::from_secs(1);

/// Payload of one SSE `data:` frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamUpdate {
  pub count:     usize,
  pub calls:     Vec<CallSummary>,
  /// Local wall-clock time the sample was taken, `%Y-%m-%d %H:%M:%S`.
  pub timestamp: String,
}

/// Build the next update from `snapshot`, or `None` if the count hasn't
/// moved since `last_count`.
pub(crate) fn next_update(
  last_count: Option<usize>,
  snapshot: RegistrySnapshot,
) -> Option<StreamUpdate> {
  if last_count == Some(snapshot.count) {
    return None;
  }
  Some(StreamUpdate {
    count:     snapshot.count,
    calls:     summarize(snapshot.calls),
    timestamp: Utc::now()
      .with_timezone(&chrono::Local)
      .format("%Y-%m-%d %H:%M:%S")
      .to_string(),
  })
}

/// `GET /stream`
pub async fn handler<R>(
  State(registry): State<Arc<R>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
  R: CallRegistry + 'static,
{
  let mut ticker = interval(SAMPLE_PERIOD);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  let updates =
    stream::unfold((registry, ticker, None), |(registry, mut ticker, last)| async move {
      loop {
        ticker.tick().await;
        if let Some(update) = next_update(last, registry.snapshot()) {
          let count = update.count;
          let event = Event::default().json_data(&update);
          return Some((event, (registry, ticker, Some(count))));
        }
      }
    });

  tracing::debug!("dashboard stream opened");
  Sse::new(updates).keep_alive(KeepAlive::default())
}
