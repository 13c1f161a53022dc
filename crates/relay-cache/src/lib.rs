//! Relay Cache Handler Contract
//!
//! Defines the pluggable seam a cache orchestrator implements on top of the
//! `relay-policy` decision core: the [`Handler`] trait, the cached-exchange
//! value types it trades in, and an adapter from tower services to the
//! forward function `handle` uses to reach the origin.

pub mod error;
pub mod handler;
pub mod service;

pub use error::CacheError;
pub use handler::{BoxError, CachedExchange, Forward, Handled, Handler};
pub use service::forward_from_service;

// The decision core, re-exported so orchestrators depend on one crate.
pub use relay_policy as policy;
