//! In-memory backend for the Dialtone active-call registry.
//!
//! One coarse mutex guards the whole map. Call volumes are tens of
//! concurrent calls, capped by admission control upstream.

mod registry;

pub use registry::InMemoryRegistry;
