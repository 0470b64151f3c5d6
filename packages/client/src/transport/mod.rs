//! Transport seam
//!
//! The orchestrator never talks to the network directly. It hands a fully
//! built request and the call's abort signal to a [`Transport`] and gets
//! back status, headers and a chunk stream. Swapping the transport is how
//! tests run the whole pipeline without sockets.

mod hyper_client;

use futures::future::BoxFuture;
use url::Url;

use crate::abort::AbortSignal;
use crate::error::BoxError;
use crate::http::{BodyStream, WireBody};

pub use hyper_client::HyperTransport;

/// Request as handed to a transport
pub type TransportRequest = http::Request<WireBody>;

/// Response as returned by a transport
pub type TransportResponse = http::Response<BodyStream>;

/// Reason phrase sent by the server, attached as a response extension
///
/// Transports that know the literal phrase insert it; otherwise the
/// canonical reason for the status is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusText(pub String);

/// Final URL of a response after redirects, attached as a response extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseUrl(pub Url);

/// Common interface for everything that can put a request on the wire
///
/// Implementations must observe `signal`: once it aborts, the returned
/// future should settle promptly with an error and release its connection.
pub trait Transport: Send + Sync + 'static {
    /// Send `request` and resolve once response headers are available.
    ///
    /// # Errors
    ///
    /// Returns the underlying failure when no response could be obtained.
    fn fetch(
        &self,
        request: TransportRequest,
        signal: AbortSignal,
    ) -> BoxFuture<'static, Result<TransportResponse, BoxError>>;

    /// Transport name for debugging/logging
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> Transport for F
where
    F: Fn(TransportRequest, AbortSignal) -> BoxFuture<'static, Result<TransportResponse, BoxError>>
        + Send
        + Sync
        + 'static,
{
    fn fetch(
        &self,
        request: TransportRequest,
        signal: AbortSignal,
    ) -> BoxFuture<'static, Result<TransportResponse, BoxError>> {
        self(request, signal)
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}
