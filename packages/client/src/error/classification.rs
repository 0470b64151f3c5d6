use http::StatusCode;

use super::types::{ErrorBody, FetchError, Kind};
use crate::abort::AbortReason;

impl FetchError {
    /// Returns true if the server answered with a non-success status.
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self.inner.kind, Kind::HttpStatus(_))
    }

    /// Returns true if the call was cancelled, by the caller or by a timeout.
    #[must_use]
    pub fn is_abort(&self) -> bool {
        matches!(self.inner.kind, Kind::Abort(_))
    }

    /// Returns true if the call was aborted because its deadline passed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.inner.kind, Kind::Abort(AbortReason::TimedOut))
    }

    /// Returns true if the transport failed before any response arrived.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self.inner.kind, Kind::Network)
    }

    /// Returns true if encoding the request or decoding the response failed.
    #[must_use]
    pub fn is_serialization(&self) -> bool {
        matches!(self.inner.kind, Kind::Serialization)
    }

    /// Returns true if the request could not be built.
    #[must_use]
    pub fn is_builder(&self) -> bool {
        matches!(self.inner.kind, Kind::Builder)
    }

    /// Returns true if a before or after hook failed.
    #[must_use]
    pub fn is_hook(&self) -> bool {
        matches!(self.inner.kind, Kind::Hook)
    }

    /// Returns true if reading the response body failed.
    #[must_use]
    pub fn is_body(&self) -> bool {
        matches!(self.inner.kind, Kind::Body)
    }

    /// Returns the status code, if the error was generated from a response.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self.inner.kind {
            Kind::HttpStatus(code) => Some(code),
            _ => None,
        }
    }

    /// Returns the status text of the failed response.
    #[must_use]
    pub fn status_text(&self) -> Option<&str> {
        self.inner.status_text.as_deref()
    }

    /// Returns the parsed body of the failed response, when it could be read.
    #[must_use]
    pub fn body(&self) -> Option<&ErrorBody> {
        self.inner.body.as_ref()
    }

    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Transport failures, interrupted body reads, 408, 429 and 5xx responses
    /// are retryable. Cancellation, builder, hook and serialization failures
    /// are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.inner.kind {
            Kind::Network | Kind::Body => true,
            Kind::HttpStatus(status) => {
                status.is_server_error()
                    || status == StatusCode::TOO_MANY_REQUESTS
                    || status == StatusCode::REQUEST_TIMEOUT
            }
            Kind::Abort(_) | Kind::Serialization | Kind::Builder | Kind::Hook => false,
        }
    }
}
