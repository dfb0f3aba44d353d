//! The `CallRegistry` trait and its supporting result types.
//!
//! The trait is implemented by registry backends (e.g. `dialtone-registry`).
//! Higher layers (`dialtone-api`, `dialtone-webhook`) depend on this
//! abstraction, not on any concrete backend.
//!
//! Absence is a routine outcome here: a late status callback or a menu
//! response racing a hang-up both reference calls that are already gone. Those
//! lookups return `None` rather than an error.

use serde::{Deserialize, Serialize};

use crate::call::{CallRecord, IvrSelection};

// ─── Result types ────────────────────────────────────────────────────────────

/// Outcome of [`CallRegistry::try_register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
  /// A new record was inserted.
  Accepted(CallRecord),
  /// The id was already tracked; the existing record is returned unchanged.
  Duplicate(CallRecord),
  /// The registry already held `active` calls, at or above the limit.
  Rejected { active: usize },
}

/// Count and records taken under a single lock acquisition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
  pub count: usize,
  pub calls: Vec<CallRecord>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Authoritative set of in-progress calls.
///
/// Every method is atomic with respect to every other: no caller observes a
/// half-applied update. Returned records are owned copies.
pub trait CallRegistry: Send + Sync {
  /// Start tracking a call. Idempotent: if `call_id` is already present the
  /// existing record is returned unchanged.
  fn register(&self, call_id: &str, from: &str, to: &str) -> CallRecord;

  /// Register unless `limit` calls are already active.
  ///
  /// The duplicate check, the capacity check and the insert happen under one
  /// lock, so concurrent starts can never push the count past `limit`.
  fn try_register(
    &self,
    call_id: &str,
    from: &str,
    to: &str,
    limit: usize,
  ) -> Admission;

  /// Record the caller's menu choice. `None` if the call is not tracked.
  fn set_selection(
    &self,
    call_id: &str,
    selection: IvrSelection,
  ) -> Option<CallRecord>;

  /// Stop tracking a call and return its final state (`active = false`,
  /// `end_time` set). `None` if the call is not tracked.
  fn terminate(&self, call_id: &str) -> Option<CallRecord>;

  /// Look up one tracked call.
  fn get(&self, call_id: &str) -> Option<CallRecord>;

  /// All tracked calls, in no particular order.
  fn list_active(&self) -> Vec<CallRecord>;

  fn count_active(&self) -> usize;

  /// Count and list from the same instant.
  fn snapshot(&self) -> RegistrySnapshot;
}
