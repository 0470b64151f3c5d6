//! hyper-backed transport with rustls

use std::fmt;

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{StreamExt, TryStreamExt};
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, BodyStream as FrameStream, Empty, Full, StreamBody};
use hyper::ext::ReasonPhrase;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use super::{StatusText, Transport, TransportRequest, TransportResponse};
use crate::abort::{AbortReason, AbortSignal};
use crate::error::{self, BoxError, Result};
use crate::http::WireBody;

type HyperBody = UnsyncBoxBody<Bytes, BoxError>;

/// Pooled HTTP/1.1 and HTTP/2 transport over TCP, with TLS from rustls
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpsConnector<HttpConnector>, HyperBody>,
}

impl HyperTransport {
    /// Build a transport trusting the bundled webpki roots.
    ///
    /// # Errors
    ///
    /// Returns a builder error if the TLS configuration cannot be created.
    pub fn new() -> Result<Self> {
        let https = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
            .map_err(error::builder)?
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(https);
        Ok(Self { client })
    }
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport").finish_non_exhaustive()
    }
}

impl Transport for HyperTransport {
    fn fetch(
        &self,
        request: TransportRequest,
        signal: AbortSignal,
    ) -> BoxFuture<'static, std::result::Result<TransportResponse, BoxError>> {
        let client = self.client.clone();
        async move {
            let request = request.map(into_hyper_body);
            tracing::trace!(method = %request.method(), uri = %request.uri(), "dispatching over hyper");

            let response = tokio::select! {
                biased;
                () = signal.cancelled() => {
                    let reason = signal.reason().unwrap_or(AbortReason::Aborted);
                    return Err(Box::new(reason) as BoxError);
                }
                response = client.request(request) => response.map_err(|e| Box::new(e) as BoxError)?,
            };

            let (mut parts, incoming) = response.into_parts();
            if let Some(phrase) = parts.extensions.remove::<ReasonPhrase>() {
                let text = String::from_utf8_lossy(phrase.as_bytes()).into_owned();
                parts.extensions.insert(StatusText(text));
            }

            let frames = FrameStream::new(incoming);
            let chunks = TryStreamExt::map_err(frames, |e| Box::new(e) as BoxError)
                .try_filter_map(|frame| async move { Ok(frame.into_data().ok()) })
                .boxed();

            Ok(http::Response::from_parts(parts, chunks))
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "hyper"
    }
}

fn into_hyper_body(body: WireBody) -> HyperBody {
    match body {
        WireBody::Empty => Empty::<Bytes>::new()
            .map_err(|never| match never {})
            .boxed_unsync(),
        WireBody::Bytes(bytes) => Full::new(bytes)
            .map_err(|never| match never {})
            .boxed_unsync(),
        WireBody::Stream(stream) => StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync(),
    }
}
