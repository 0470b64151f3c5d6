//! Lazy handle for a prepared call

use std::future::IntoFuture;

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;

use super::core::FetchClient;
use super::execute::execute;
use crate::error::Result;
use crate::http::{Blob, FormData, RequestConfig, Response};

/// A call that has been configured but not sent
///
/// Await it to get the [`Response`], or use one of the accessor methods to
/// send and read the body in one step. Each accessor consumes the handle,
/// so a body can only be read once.
#[must_use = "requests do nothing unless awaited"]
pub struct PendingRequest {
    client: Result<FetchClient>,
    url: String,
    config: RequestConfig,
}

impl PendingRequest {
    pub(crate) fn new(client: Result<FetchClient>, url: String, config: RequestConfig) -> Self {
        Self { client, url, config }
    }

    /// The URL as given, before query encoding.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Send the request.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` for a non-2xx status, a transport failure, an
    /// abort or timeout, a failing hook, or a request that could not be built.
    pub async fn send(self) -> Result<Response> {
        let client = self.client?;
        execute(client, self.url, self.config).await
    }

    /// Send the request and deserialize a JSON body.
    ///
    /// # Errors
    ///
    /// See [`PendingRequest::send`] and [`Response::json`].
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        self.send().await?.json().await
    }

    /// Send the request and read the body as text.
    ///
    /// # Errors
    ///
    /// See [`PendingRequest::send`] and [`Response::text`].
    pub async fn text(self) -> Result<String> {
        self.send().await?.text().await
    }

    /// # Errors
    ///
    /// See [`PendingRequest::send`] and [`Response::bytes`].
    pub async fn bytes(self) -> Result<Bytes> {
        self.send().await?.bytes().await
    }

    /// # Errors
    ///
    /// See [`PendingRequest::send`] and [`Response::blob`].
    pub async fn blob(self) -> Result<Blob> {
        self.send().await?.blob().await
    }

    /// # Errors
    ///
    /// See [`PendingRequest::send`] and [`Response::array_buffer`].
    pub async fn array_buffer(self) -> Result<Vec<u8>> {
        self.send().await?.array_buffer().await
    }

    /// # Errors
    ///
    /// See [`PendingRequest::send`] and [`Response::form_data`].
    pub async fn form_data(self) -> Result<FormData> {
        self.send().await?.form_data().await
    }
}

impl IntoFuture for PendingRequest {
    type Output = Result<Response>;
    type IntoFuture = BoxFuture<'static, Result<Response>>;

    fn into_future(self) -> Self::IntoFuture {
        self.send().boxed()
    }
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("url", &self.url)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
