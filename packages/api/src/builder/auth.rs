//! Authentication methods for HTTP requests
//!
//! Helpers for API keys, basic authentication and bearer tokens. The
//! `Authorization` value is marked sensitive so it stays out of debug output.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::HeaderValue;

use crate::builder::core::FetchBuilder;
use crate::builder::headers::header;

impl<S> FetchBuilder<S> {
    /// Send `key` in the `X-API-Key` header.
    #[must_use]
    pub fn api_key(self, key: &str) -> Self {
        self.sensitive_header(header::X_API_KEY, key.to_string())
    }

    /// Set `Authorization: Basic <base64(user:pass)>`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchkit::FetchBuilder;
    ///
    /// let pending = FetchBuilder::json()
    ///     .basic_auth("admin", "secret")
    ///     .get("https://api.example.com/admin");
    /// ```
    #[must_use]
    pub fn basic_auth(self, user: &str, pass: &str) -> Self {
        let encoded = STANDARD.encode(format!("{user}:{pass}"));
        self.sensitive_header(header::AUTHORIZATION, format!("Basic {encoded}"))
    }

    /// Set `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer_auth(self, token: &str) -> Self {
        self.sensitive_header(header::AUTHORIZATION, format!("Bearer {token}"))
    }

    fn sensitive_header(self, name: header::HeaderName, value: String) -> Self {
        match HeaderValue::from_str(&value) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.header(name, value)
            }
            // Let the config record the invalid value as a builder error.
            Err(_) => self.header(name, value),
        }
    }
}
