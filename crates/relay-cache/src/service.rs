//! Adapters between tower services and forward functions

use bytes::Bytes;
use http::{Request, Response};
use tower::{Service, ServiceExt};

use crate::handler::{BoxError, Forward};

/// Turn a tower [`Service`] into a one-shot [`Forward`] function.
///
/// Lets an orchestrator (or a test) reach "the origin" through any service
/// stack that speaks `Request<Bytes> -> Response<Bytes>`, such as a client
/// or an in-process application under test.
pub fn forward_from_service<S>(service: S) -> Forward<'static>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>> + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    Box::new(move |req| Box::pin(async move { service.oneshot(req).await.map_err(Into::into) }))
}
