//! Header management for `FetchBuilder`
//!
//! Named header helpers plus the generic `header`/`headers` setters. Invalid
//! names or values are reported when the request is sent.

use http::header::{self as http_header, HeaderName, HeaderValue};

use crate::builder::core::{ContentType, FetchBuilder};

/// Header names not covered by [`http::header`]
pub mod header {
    pub use http::header::*;

    /// `X-API-Key` header name
    pub const X_API_KEY: http::header::HeaderName =
        http::header::HeaderName::from_static("x-api-key");

    /// `X-Request-ID` header name
    pub const X_REQUEST_ID: http::header::HeaderName =
        http::header::HeaderName::from_static("x-request-id");
}

/// Common `Accept` header values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptValue {
    Json,
    Text,
    Html,
    Xml,
    Any,
}

impl AcceptValue {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AcceptValue::Json => "application/json",
            AcceptValue::Text => "text/plain",
            AcceptValue::Html => "text/html",
            AcceptValue::Xml => "application/xml",
            AcceptValue::Any => "*/*",
        }
    }
}

impl<S> FetchBuilder<S> {
    /// Set a header, replacing earlier values with the same name.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchkit::FetchBuilder;
    /// use fetchkit::header::X_REQUEST_ID;
    ///
    /// let pending = FetchBuilder::new()
    ///     .header(X_REQUEST_ID, "req-42")
    ///     .get("https://api.example.com/status");
    /// ```
    #[must_use]
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.config = self.config.header(key, value);
        self
    }

    /// Set several headers at once.
    #[must_use]
    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        headers
            .into_iter()
            .fold(self, |builder, (key, value)| builder.header(key, value))
    }

    #[must_use]
    pub fn accept(self, accept: AcceptValue) -> Self {
        self.header(http_header::ACCEPT, accept.as_str())
    }

    #[must_use]
    pub fn accept_content_type(self, content_type: ContentType) -> Self {
        self.header(http_header::ACCEPT, content_type.as_str())
    }

    /// Override the client's `User-Agent` for this call.
    #[must_use]
    pub fn user_agent(self, user_agent: &str) -> Self {
        self.header(http_header::USER_AGENT, user_agent)
    }

    #[must_use]
    pub fn cache_control(self, value: &str) -> Self {
        self.header(http_header::CACHE_CONTROL, value)
    }

    /// Set `Cache-Control: max-age=<seconds>`.
    #[must_use]
    pub fn max_age(self, seconds: u64) -> Self {
        self.header(http_header::CACHE_CONTROL, format!("max-age={seconds}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_apply_in_order() {
        let builder = FetchBuilder::new()
            .headers([("x-one", "1"), ("x-two", "2"), ("x-one", "3")])
            .max_age(60)
            .accept(AcceptValue::Text);

        let headers = builder.config().get_headers();
        assert_eq!(headers["x-one"], "3");
        assert_eq!(headers["x-two"], "2");
        assert_eq!(headers["cache-control"], "max-age=60");
        assert_eq!(headers["accept"], "text/plain");
    }

    #[test]
    fn invalid_header_value_is_deferred() {
        let builder = FetchBuilder::new().user_agent("bad\r\nagent");
        assert!(builder.config().pending_error().is_some());
    }
}
