//! The cache handler contract
//!
//! The seam between the decision core and a concrete cache orchestrator. An
//! implementation owns the parts this workspace deliberately does not: the
//! store, cache keys, conditional-request construction, revalidation
//! transport, and any single-flight coordination. The contract only fixes
//! the shape of the two decisions every orchestrator makes.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use http::{Request, Response};

use crate::error::CacheError;

/// Boxed transport error produced by a forward function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One-shot path to the origin for a single request.
pub type Forward<'a> =
    Box<dyn FnOnce(Request<Bytes>) -> BoxFuture<'a, Result<Response<Bytes>, BoxError>> + Send + 'a>;

/// A previously stored request/response pair.
#[derive(Debug)]
pub struct CachedExchange {
    /// The request that produced the stored response
    pub request: Request<Bytes>,
    /// The stored response
    pub response: Response<Bytes>,
}

/// Outcome of handling one request through the cache.
#[derive(Debug)]
pub struct Handled {
    /// Whether the stored response was used, directly or after a successful
    /// revalidation
    pub cache_used: bool,
    /// The response to return to the client
    pub response: Response<Bytes>,
}

/// Capability an external cache orchestrator provides.
///
/// `storable` carries the same contract as
/// [`SharedPolicy::storable`](relay_policy::SharedPolicy), so the policy
/// engine can be substituted or wrapped; `handle` is where the orchestrator
/// decides between serving the stored copy, revalidating it, and forwarding
/// unconditionally.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Decide whether the exchange may be stored, and until when it stays
    /// fresh. `None` means it must not be stored.
    fn storable(
        &self,
        req: &Request<Bytes>,
        res: &Response<Bytes>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>>;

    /// Answer `req` from the stored exchange, after revalidating it, or by
    /// forwarding to the origin via `forward`.
    async fn handle(
        &self,
        req: Request<Bytes>,
        cached: Option<CachedExchange>,
        forward: Forward<'_>,
        now: DateTime<Utc>,
    ) -> Result<Handled, CacheError>;
}
