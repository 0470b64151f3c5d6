use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;
use url::Url;

use crate::abort::AbortReason;

/// A `Result` alias where the `Err` case is `fetchkit_client::FetchError`.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Boxed error used at the transport and hook seams.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Failure of a request, a body read, or a retried operation.
///
/// Every non-success outcome of a call resolves to exactly one `FetchError`.
/// Use the `is_*` methods or [`FetchError::kind`] to tell them apart.
pub struct FetchError {
    pub(crate) inner: Box<Inner>,
}

pub(crate) struct Inner {
    pub(crate) kind: Kind,
    pub(crate) source: Option<BoxError>,
    pub(crate) url: Option<Url>,
    pub(crate) status_text: Option<String>,
    pub(crate) body: Option<ErrorBody>,
}

/// Classification of a `FetchError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The server answered with a status outside 200-299
    HttpStatus(StatusCode),
    /// The caller's signal or the timeout aborted the call
    Abort(AbortReason),
    /// The transport failed before a response arrived
    Network,
    /// Encoding a request body or decoding a response body failed
    Serialization,
    /// The request could not be built (invalid URL, header, method)
    Builder,
    /// A before or after hook returned an error
    Hook,
    /// Reading the response body stream failed
    Body,
}

/// Best-effort parsed body of a failed response
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(serde_json::Value),
    Text(String),
}

impl ErrorBody {
    /// The JSON payload, if the body was parsed as JSON.
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ErrorBody::Json(value) => Some(value),
            ErrorBody::Text(_) => None,
        }
    }

    /// The text payload, if the body was kept as text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ErrorBody::Json(_) => None,
            ErrorBody::Text(text) => Some(text),
        }
    }
}

impl FetchError {
    #[must_use]
    pub fn new(kind: Kind) -> FetchError {
        FetchError {
            inner: Box::new(Inner {
                kind,
                source: None,
                url: None,
                status_text: None,
                body: None,
            }),
        }
    }

    #[must_use = "FetchError builder methods return a new FetchError and should be used"]
    pub fn with<E: Into<BoxError>>(mut self, source: E) -> FetchError {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: Url) -> FetchError {
        self.inner.url = Some(url);
        self
    }

    #[must_use]
    pub(crate) fn with_status_text(mut self, status_text: String) -> FetchError {
        self.inner.status_text = Some(status_text);
        self
    }

    #[must_use]
    pub(crate) fn with_body(mut self, body: Option<ErrorBody>) -> FetchError {
        self.inner.body = body;
        self
    }

    /// The classification of this error.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.inner.kind
    }

    /// The URL of the request that failed, if known.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.inner.url.as_ref()
    }

    /// Take the underlying source error, e.g. the error a hook returned.
    #[must_use]
    pub fn into_source(self) -> Option<BoxError> {
        self.inner.source
    }
}

impl fmt::Debug for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("fetchkit::FetchError");

        f.field("kind", &self.inner.kind);

        if let Some(ref url) = self.inner.url {
            f.field("url", &url.as_str());
        }

        if let Some(ref status_text) = self.inner.status_text {
            f.field("status_text", status_text);
        }

        if let Some(ref body) = self.inner.body {
            f.field("body", body);
        }

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        f.finish()
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Abort(reason) => write!(f, "request aborted: {reason}")?,
            Kind::Network => f.write_str("error sending request")?,
            Kind::Serialization => f.write_str("body serialization error")?,
            Kind::Builder => f.write_str("builder error")?,
            Kind::Hook => f.write_str("request hook failed")?,
            Kind::Body => f.write_str("error reading response body")?,
            Kind::HttpStatus(code) => {
                let prefix = if code.is_client_error() {
                    "HTTP status client error"
                } else if code.is_server_error() {
                    "HTTP status server error"
                } else {
                    "HTTP status error"
                };
                match self.inner.status_text.as_deref() {
                    Some(text) if !text.is_empty() => {
                        write!(f, "{prefix} ({} {text})", code.as_str())?;
                    }
                    _ => write!(f, "{prefix} ({code})")?,
                }
            }
        }

        if let Some(ref url) = self.inner.url {
            write!(f, " for url ({url})")?;
        }

        Ok(())
    }
}

impl StdError for FetchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
