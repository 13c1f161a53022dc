//! Relay Cache Policy Core
//!
//! The RFC 9111 decision procedures of a shared HTTP cache: Cache-Control
//! directive parsing, freshness lifetime calculation, and the storability
//! checklist. This crate is the policy oracle only; stores, cache keys, and
//! revalidation transports belong to the surrounding orchestrator (see the
//! `relay-cache` handler contract).

pub mod directive;
pub mod error;
pub mod freshness;
pub mod shared;

pub use directive::{RequestDirectives, ResponseDirectives};
pub use error::DirectiveError;
pub use freshness::calculate_expires;
pub use shared::{PolicyConfig, SharedPolicy};
