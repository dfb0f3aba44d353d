//! Core types and trait definitions for the Dialtone telephony test harness.
//!
//! No HTTP or markup dependencies live here. Every other crate depends on
//! this one.

pub mod call;
pub mod credentials;
pub mod error;
pub mod registry;
pub mod response;

pub use error::{Error, Result};
