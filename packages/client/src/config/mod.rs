//! Client-wide configuration
//!
//! Values here apply to every call made through a `FetchClient` unless the
//! call's own `RequestConfig` overrides them.

use std::time::Duration;

use http::HeaderMap;
use http::header::HeaderValue;

use crate::retry::RetryPolicy;

/// Longest accepted user agent, in bytes
const MAX_USER_AGENT_LEN: usize = 1000;

/// Longest accepted default timeout
const MAX_TIMEOUT: Duration = Duration::from_secs(3600);

/// Configuration shared by every call of a `FetchClient`
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Headers sent with every request; per-call headers win on conflict
    pub default_headers: HeaderMap,
    /// Timeout applied when a call does not set its own
    pub timeout: Option<Duration>,
    /// `User-Agent` sent unless the call sets one
    pub user_agent: String,
    /// Policy used by `FetchClient::retry_options`
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_headers: HeaderMap::new(),
            timeout: None,
            user_agent: concat!("fetchkit/", env!("CARGO_PKG_VERSION")).to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Validates the configuration settings
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found:
    /// - the user agent is empty, longer than 1000 bytes, or not a valid header value
    /// - the timeout is zero or exceeds 1 hour
    /// - the retry policy is inconsistent
    pub fn validate(&self) -> Result<(), String> {
        if self.user_agent.is_empty() {
            return Err("user_agent cannot be empty".to_string());
        }
        if self.user_agent.len() > MAX_USER_AGENT_LEN {
            return Err(format!("user_agent cannot exceed {MAX_USER_AGENT_LEN} bytes"));
        }
        if HeaderValue::from_str(&self.user_agent).is_err() {
            return Err("user_agent is not a valid header value".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err("timeout cannot be zero; use None to disable it".to_string());
            }
            if timeout > MAX_TIMEOUT {
                return Err("timeout cannot exceed 1 hour".to_string());
            }
        }

        self.retry
            .validate()
            .map_err(|reason| format!("invalid retry policy: {reason}"))
    }
}
