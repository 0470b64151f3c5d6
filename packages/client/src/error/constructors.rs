use http::StatusCode;
use url::Url;

use super::types::{BoxError, ErrorBody, FetchError, Kind};
use crate::abort::AbortReason;

/// Creates a `FetchError` for a request that could not be built.
pub fn builder<E: Into<BoxError>>(e: E) -> FetchError {
    FetchError::new(Kind::Builder).with(e.into())
}

/// Creates a `FetchError` for a transport failure with no response.
pub fn network<E: Into<BoxError>>(e: E) -> FetchError {
    FetchError::new(Kind::Network).with(e.into())
}

/// Creates a `FetchError` for a body encoding or decoding failure.
pub fn serialization<E: Into<BoxError>>(e: E) -> FetchError {
    FetchError::new(Kind::Serialization).with(e.into())
}

/// Creates a `FetchError` wrapping the error a hook returned.
pub fn hook<E: Into<BoxError>>(e: E) -> FetchError {
    FetchError::new(Kind::Hook).with(e.into())
}

/// Creates a `FetchError` for a failed response body read.
pub fn body<E: Into<BoxError>>(e: E) -> FetchError {
    FetchError::new(Kind::Body).with(e.into())
}

/// Creates a `FetchError` for a cancelled or timed out call.
pub fn aborted(reason: AbortReason) -> FetchError {
    FetchError::new(Kind::Abort(reason)).with(reason)
}

/// Creates a `FetchError` for a non-success response.
pub fn http_status(
    url: Url,
    status: StatusCode,
    status_text: String,
    body: Option<ErrorBody>,
) -> FetchError {
    FetchError::new(Kind::HttpStatus(status))
        .with_url(url)
        .with_status_text(status_text)
        .with_body(body)
}
