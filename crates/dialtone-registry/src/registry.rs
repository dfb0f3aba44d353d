//! [`InMemoryRegistry`]: the mutex-guarded implementation of
//! [`CallRegistry`].

use std::{
  collections::{HashMap, hash_map::Entry},
  sync::Arc,
};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use dialtone_core::{
  call::{CallRecord, IvrSelection},
  registry::{Admission, CallRegistry, RegistrySnapshot},
};

/// Active calls keyed by carrier call id.
///
/// Cloning is cheap and every clone shares the same map.
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
  calls: Arc<Mutex<HashMap<String, CallRecord>>>,
}

impl InMemoryRegistry {
  pub fn new() -> Self { Self::default() }
}

impl CallRegistry for InMemoryRegistry {
  fn register(&self, call_id: &str, from: &str, to: &str) -> CallRecord {
    let (record, inserted) = {
      let mut calls = self.calls.lock();
      match calls.entry(call_id.to_owned()) {
        Entry::Occupied(e) => (e.get().clone(), false),
        Entry::Vacant(e) => {
          let record = CallRecord::new(call_id, from, to, Utc::now());
          (e.insert(record).clone(), true)
        }
      }
    };

    if inserted {
      info!(call_id, from, to, "call registered");
    } else {
      warn!(call_id, "duplicate start notification for tracked call");
    }
    record
  }

  fn try_register(
    &self,
    call_id: &str,
    from: &str,
    to: &str,
    limit: usize,
  ) -> Admission {
    let admission = {
      let mut calls = self.calls.lock();
      let active = calls.len();
      match calls.entry(call_id.to_owned()) {
        Entry::Occupied(e) => Admission::Duplicate(e.get().clone()),
        Entry::Vacant(_) if active >= limit => Admission::Rejected { active },
        Entry::Vacant(e) => {
          let record = CallRecord::new(call_id, from, to, Utc::now());
          Admission::Accepted(e.insert(record).clone())
        }
      }
    };

    match &admission {
      Admission::Accepted(_) => info!(call_id, from, to, "call registered"),
      Admission::Duplicate(_) => {
        warn!(call_id, "duplicate start notification for tracked call")
      }
      Admission::Rejected { active } => {
        debug!(call_id, active, limit, "call refused at capacity")
      }
    }
    admission
  }

  fn set_selection(
    &self,
    call_id: &str,
    selection: IvrSelection,
  ) -> Option<CallRecord> {
    let updated = self.calls.lock().get_mut(call_id).map(|record| {
      record.ivr_selection = Some(selection);
      record.clone()
    });

    match &updated {
      Some(_) => debug!(call_id, %selection, "menu selection recorded"),
      None => debug!(call_id, %selection, "menu selection for untracked call"),
    }
    updated
  }

  fn terminate(&self, call_id: &str) -> Option<CallRecord> {
    let removed = self.calls.lock().remove(call_id);

    match removed {
      Some(record) => {
        let ended = record.end(Utc::now());
        info!(call_id, "call ended");
        Some(ended)
      }
      None => {
        debug!(call_id, "termination for untracked call");
        None
      }
    }
  }

  fn get(&self, call_id: &str) -> Option<CallRecord> {
    self.calls.lock().get(call_id).cloned()
  }

  fn list_active(&self) -> Vec<CallRecord> {
    self.calls.lock().values().cloned().collect()
  }

  fn count_active(&self) -> usize { self.calls.lock().len() }

  fn snapshot(&self) -> RegistrySnapshot {
    let calls = self.calls.lock();
    RegistrySnapshot {
      count: calls.len(),
      calls: calls.values().cloned().collect(),
    }
  }
}
