//! Handlers for `/calls` and `/call_count`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/calls` | Active calls with elapsed duration, oldest first |
//! | `GET`  | `/calls/:id` | Single active call; 404 once it has ended |
//! | `GET`  | `/call_count` | `{"count": n}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use dialtone_core::{
  call::{CallRecord, CallSummary},
  registry::CallRegistry,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Summaries for `records`, ordered by start time then id.
///
/// The registry gives no ordering guarantee; the dashboard wants a stable one.
pub(crate) fn summarize(mut records: Vec<CallRecord>) -> Vec<CallSummary> {
  records.sort_by(|a, b| {
    a.start_time
      .cmp(&b.start_time)
      .then_with(|| a.call_id.cmp(&b.call_id))
  });
  let now = Utc::now();
  records
    .into_iter()
    .map(|r| CallSummary::at(r, now))
    .collect()
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /calls`
pub async fn list<R>(State(registry): State<Arc<R>>) -> Json<Vec<CallSummary>>
where
  R: CallRegistry,
{
  Json(summarize(registry.list_active()))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /calls/:id`
pub async fn get_one<R>(
  State(registry): State<Arc<R>>,
  Path(id): Path<String>,
) -> Result<Json<CallSummary>, ApiError>
where
  R: CallRegistry,
{
  let record = registry
    .get(&id)
    .ok_or_else(|| ApiError::NotFound(format!("call {id} not active")))?;
  Ok(Json(CallSummary::at(record, Utc::now())))
}

// ─── Count ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CountBody {
  pub count: usize,
}

/// `GET /call_count`
pub async fn count<R>(State(registry): State<Arc<R>>) -> Json<CountBody>
where
  R: CallRegistry,
{
  Json(CountBody {
    count: registry.count_active(),
  })
}
