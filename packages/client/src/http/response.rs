//! Responses and their single-read bodies
//!
//! A `Response` owns its body stream. Every body accessor consumes the
//! response, so reading the body twice is a compile error rather than a
//! runtime surprise.

use std::fmt;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, StreamExt};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, StatusCode, Version};
use serde::de::DeserializeOwned;
use url::Url;

use super::body::BodyStream;
use super::multipart::FormData;
use crate::abort::CallGuard;
use crate::error::{self, BoxError, Result};
use crate::transport::{ResponseUrl, StatusText, TransportResponse};

/// Single-read response body
///
/// Reads honour the cancellation scope of the call that produced the
/// response: once its signal aborts or its deadline passes, no further
/// chunks are read.
pub struct Body {
    stream: Option<BodyStream>,
    guard: Option<CallGuard>,
}

impl Body {
    #[must_use]
    pub fn new(stream: BodyStream) -> Self {
        Self {
            stream: Some(stream),
            guard: None,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            stream: None,
            guard: None,
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes: Bytes = bytes.into();
        if bytes.is_empty() {
            return Self::empty();
        }
        Self::new(stream::once(async move { Ok::<_, BoxError>(bytes) }).boxed())
    }

    #[must_use]
    pub(crate) fn guarded(mut self, guard: CallGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Replace the underlying stream while keeping the cancellation scope.
    #[must_use]
    pub fn map_stream<F>(mut self, f: F) -> Self
    where
        F: FnOnce(BodyStream) -> BodyStream,
    {
        self.stream = self.stream.take().map(f);
        self
    }

    /// Read the next chunk, or `None` at the end of the body.
    ///
    /// # Errors
    ///
    /// Returns an abort error once the call's signal or deadline fires, and a
    /// body error if the underlying stream fails. After a stream failure the
    /// body is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };

        let next = match &self.guard {
            Some(guard) => guard.run(stream.next()).await.map_err(error::aborted)?,
            None => stream.next().await,
        };

        match next {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(source)) => {
                self.stream = None;
                Err(error::body(source))
            }
            None => {
                self.stream = None;
                Ok(None)
            }
        }
    }

    /// Read the whole body into memory.
    ///
    /// # Errors
    ///
    /// See [`Body::chunk`].
    pub async fn collect(mut self) -> Result<Bytes> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.chunk().await? {
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }

    /// Turn the body into a plain chunk stream, still honouring cancellation.
    #[must_use]
    pub fn into_stream(self) -> BodyStream {
        stream::unfold(Some(self), |state| async move {
            let mut body = state?;
            match body.chunk().await {
                Ok(Some(chunk)) => Some((Ok(chunk), Some(body))),
                Ok(None) => None,
                Err(err) => Some((Err(Box::new(err) as BoxError), None)),
            }
        })
        .boxed()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("exhausted", &self.stream.is_none())
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

/// Binary body together with its declared media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl Blob {
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Response metadata plus its single-read body
///
/// Body accessors consume the response, so a body cannot be read twice:
///
/// ```compile_fail
/// # async fn read(response: fetchkit_client::Response) {
/// let text = response.text().await;
/// let bytes = response.bytes().await;
/// # }
/// ```
pub struct Response {
    status: StatusCode,
    status_text: String,
    version: Version,
    headers: HeaderMap,
    url: Url,
    body: Body,
}

impl Response {
    /// Build a response by hand, e.g. inside an after-hook or a test transport.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url, body: Body) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            version: Version::HTTP_11,
            headers,
            url,
            body,
        }
    }

    /// Normalize a transport response.
    ///
    /// The final URL and reason phrase are taken from the `ResponseUrl` and
    /// `StatusText` extensions when the transport provides them.
    #[must_use]
    pub fn from_transport(response: TransportResponse, request_url: Url) -> Self {
        let (mut parts, stream) = response.into_parts();
        let url = parts
            .extensions
            .remove::<ResponseUrl>()
            .map_or(request_url, |ResponseUrl(url)| url);
        let status_text = parts
            .extensions
            .remove::<StatusText>()
            .map(|StatusText(text)| text)
            .unwrap_or_else(|| parts.status.canonical_reason().unwrap_or_default().to_string());

        Self {
            status: parts.status,
            status_text,
            version: parts.version,
            headers: parts.headers,
            url,
            body: Body::new(stream),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Whether the status is in the success range 200-299.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The final URL of the response.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `Content-Length` as a number, if present and valid.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
    }

    /// Replace the status, resetting the status text to its canonical reason.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self.status_text = status.canonical_reason().unwrap_or_default().to_string();
        self
    }

    #[must_use]
    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    #[must_use]
    pub fn map_body<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Body) -> Body,
    {
        self.body = f(self.body);
        self
    }

    #[must_use]
    pub(crate) fn guarded(self, guard: CallGuard) -> Self {
        self.map_body(|body| body.guarded(guard))
    }

    /// Give up the metadata and keep the body.
    #[must_use]
    pub fn into_body(self) -> Body {
        self.body
    }

    /// Read the body as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an abort error if the call is cancelled or times out while
    /// reading, and a body error if the stream fails.
    pub async fn bytes(self) -> Result<Bytes> {
        self.body.collect().await
    }

    /// Read the body as an owned byte vector.
    ///
    /// # Errors
    ///
    /// See [`Response::bytes`].
    pub async fn array_buffer(self) -> Result<Vec<u8>> {
        Ok(self.bytes().await?.to_vec())
    }

    /// Read the body together with its content type.
    ///
    /// # Errors
    ///
    /// See [`Response::bytes`].
    pub async fn blob(self) -> Result<Blob> {
        let content_type = self
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let data = self.bytes().await?;
        Ok(Blob { content_type, data })
    }

    /// Read the body as UTF-8 text, replacing invalid sequences.
    ///
    /// # Errors
    ///
    /// See [`Response::bytes`].
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read and deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the body is not valid JSON for `T`,
    /// in addition to the errors of [`Response::bytes`].
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let url = self.url.clone();
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| error::serialization(e).with_url(url))
    }

    /// Read an `application/x-www-form-urlencoded` body into form fields.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for other content types, including
    /// `multipart/form-data`, in addition to the errors of [`Response::bytes`].
    pub async fn form_data(self) -> Result<FormData> {
        let content_type = self
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !content_type.starts_with("application/x-www-form-urlencoded") {
            return Err(error::serialization(format!(
                "cannot read form data from content type {content_type:?}"
            ))
            .with_url(self.url));
        }

        let bytes = self.bytes().await?;
        Ok(url::form_urlencoded::parse(&bytes).into_owned().collect())
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("url", &self.url.as_str())
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn response(headers: &[(&'static str, &'static str)], body: &'static [u8]) -> Response {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_static(value));
        }
        Response::new(
            StatusCode::OK,
            map,
            Url::parse("https://api.example/x").expect("static url parses"),
            Body::from_bytes(Bytes::from_static(body)),
        )
    }

    #[tokio::test]
    async fn json_accessor_parses_body() {
        let value: serde_json::Value = response(&[], br#"{"id":1}"#)
            .json()
            .await
            .expect("valid json body");
        assert_eq!(value, serde_json::json!({"id": 1}));
    }

    #[tokio::test]
    async fn invalid_json_is_serialization_error() {
        let err = response(&[], b"<html>")
            .json::<serde_json::Value>()
            .await
            .expect_err("html is not json");
        assert!(err.is_serialization());
        assert_eq!(err.url().map(Url::as_str), Some("https://api.example/x"));
    }

    #[tokio::test]
    async fn form_data_reads_url_encoded_bodies() {
        let form = response(
            &[("content-type", "application/x-www-form-urlencoded")],
            b"name=Jane+Doe&lang=rust",
        )
        .form_data()
        .await
        .expect("url-encoded body parses");
        assert_eq!(form.get("name"), Some("Jane Doe"));
        assert_eq!(form.get("lang"), Some("rust"));
    }

    #[tokio::test]
    async fn form_data_rejects_other_content_types() {
        let err = response(&[("content-type", "text/plain")], b"a=b")
            .form_data()
            .await
            .expect_err("text bodies are not forms");
        assert!(err.is_serialization());
    }

    #[tokio::test]
    async fn blob_keeps_content_type() {
        let blob = response(&[("content-type", "image/png")], b"\x89PNG")
            .blob()
            .await
            .expect("body reads");
        assert_eq!(blob.content_type.as_deref(), Some("image/png"));
        assert_eq!(blob.len(), 4);
    }
}
