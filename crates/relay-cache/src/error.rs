//! Handler contract error types

use thiserror::Error;

use crate::handler::BoxError;

/// Errors an orchestrator can surface from [`Handler::handle`].
///
/// [`Handler::handle`]: crate::handler::Handler::handle
#[derive(Error, Debug)]
pub enum CacheError {
    /// Forwarding to the origin failed.
    #[error("forward error: {0}")]
    Forward(#[source] BoxError),

    /// The request carried `only-if-cached` and no usable stored response
    /// existed; RFC 9111 §5.2.1.7 calls for a 504 in this case.
    #[error("no stored response available and only-if-cached set")]
    OnlyIfCached,
}
