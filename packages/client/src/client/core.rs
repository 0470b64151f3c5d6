//! Core client type
//!
//! `FetchClient` is a cheap handle: clones share the transport, the
//! configuration and the statistics, and nothing else. Calls made through
//! it are independent of each other.

use std::fmt;
use std::sync::Arc;

use super::pending::PendingRequest;
use super::stats::ClientStats;
use crate::config::ClientConfig;
use crate::error::{self, FetchError, Result};
use crate::http::RequestConfig;
use crate::retry::RetryOptions;
use crate::transport::{HyperTransport, Transport};

/// HTTP client issuing fetch-style calls over a pluggable transport
#[derive(Clone)]
pub struct FetchClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) stats: Arc<ClientStats>,
}

impl FetchClient {
    /// Create a client with the default configuration and the hyper transport.
    ///
    /// # Errors
    ///
    /// Returns a builder error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with a custom configuration and the hyper transport.
    ///
    /// # Errors
    ///
    /// Returns a builder error if `config` fails validation or the TLS
    /// backend cannot be initialized.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate().map_err(error::builder)?;
        Ok(Self::with_transport_and_config(HyperTransport::new()?, config))
    }

    /// Create a client with the default configuration over `transport`.
    #[must_use]
    pub fn with_transport(transport: impl Transport) -> Self {
        Self::with_transport_and_config(transport, ClientConfig::default())
    }

    /// Create a client over `transport`. `config` is used as given.
    #[must_use]
    pub fn with_transport_and_config(transport: impl Transport, config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
            stats: Arc::new(ClientStats::new()),
        }
    }

    /// Get current configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get client statistics for monitoring
    #[inline]
    #[must_use]
    pub fn stats(&self) -> Arc<ClientStats> {
        Arc::clone(&self.stats)
    }

    #[inline]
    #[must_use]
    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Prepare a call to `url`. Nothing is sent until the result is awaited.
    ///
    /// # Examples
    /// ```no_run
    /// use fetchkit_client::{FetchClient, RequestConfig};
    ///
    /// # async fn run() -> fetchkit_client::Result<()> {
    /// let client = FetchClient::new()?;
    /// let config = RequestConfig::new().query_param("a", 1).query_param("b", [2, 3]);
    /// let body = client.request("https://api.example/x", config).text().await?;
    /// # let _ = body;
    /// # Ok(())
    /// # }
    /// ```
    pub fn request(&self, url: impl Into<String>, config: RequestConfig) -> PendingRequest {
        PendingRequest::new(Ok(self.clone()), url.into(), config)
    }

    /// Prepare a plain GET to `url`.
    pub fn get(&self, url: impl Into<String>) -> PendingRequest {
        self.request(url, RequestConfig::new())
    }

    /// Retry options using this client's retry policy and treating only
    /// [`FetchError::is_retryable`] failures as retryable.
    #[must_use]
    pub fn retry_options(&self) -> RetryOptions<FetchError> {
        RetryOptions::new()
            .policy(self.config.retry)
            .should_retry(FetchError::is_retryable)
    }
}

impl fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchClient")
            .field("transport", &self.transport.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
