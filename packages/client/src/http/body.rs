//! Request payloads and their wire encoding
//!
//! [`encode_body`] dispatches on the payload shape and decides the
//! `Content-Type` the orchestrator sets when the caller has not set one.

use std::fmt;

use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};
use http::HeaderValue;
use serde::Serialize;

use super::multipart::FormData;
use crate::error::{self, BoxError, Result};

/// Stream of body chunks, as produced by transports and consumed by `Body`.
pub type BodyStream = BoxStream<'static, std::result::Result<Bytes, BoxError>>;

/// Request payload
#[derive(Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// Serialized as `application/json`
    Json(serde_json::Value),
    /// Encoded as `multipart/form-data`
    Form(FormData),
    /// Already url-encoded pairs, sent as `application/x-www-form-urlencoded`
    UrlEncoded(String),
    /// Raw bytes, sent untouched
    Bytes(Bytes),
    /// Streaming bytes, sent untouched
    Stream(BodyStream),
    /// Plain text, sent untouched
    Text(String),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Json(value) => f.debug_tuple("Json").field(value).finish(),
            RequestBody::Form(form) => f
                .debug_tuple("Form")
                .field(&format!("{} fields", form.len()))
                .finish(),
            RequestBody::UrlEncoded(encoded) => f.debug_tuple("UrlEncoded").field(encoded).finish(),
            RequestBody::Bytes(bytes) => f
                .debug_tuple("Bytes")
                .field(&format!("{} bytes", bytes.len()))
                .finish(),
            RequestBody::Stream(_) => f.debug_tuple("Stream").field(&"<BodyStream>").finish(),
            RequestBody::Text(text) => f
                .debug_tuple("Text")
                .field(&format!("{} chars", text.len()))
                .finish(),
        }
    }
}

impl RequestBody {
    /// Serialize `value` into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `value` cannot be represented as JSON,
    /// e.g. a map with non-string keys.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(error::serialization)
    }

    /// Url-encode `value` (a struct, map or slice of pairs) into a form body.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `value` is not a flat sequence of pairs.
    pub fn url_encoded<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_urlencoded::to_string(value)
            .map(RequestBody::UrlEncoded)
            .map_err(error::serialization)
    }

    /// Wrap a byte stream as a streaming body.
    pub fn stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        RequestBody::Stream(stream.map(|chunk| chunk.map_err(Into::into)).boxed())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<FormData> for RequestBody {
    fn from(form: FormData) -> Self {
        RequestBody::Form(form)
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for RequestBody {
    fn from(bytes: &'static [u8]) -> Self {
        RequestBody::Bytes(Bytes::from_static(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

/// Body in the shape a transport sends it
pub enum WireBody {
    Empty,
    Bytes(Bytes),
    Stream(BodyStream),
}

impl WireBody {
    /// Exact length when known up front.
    #[must_use]
    pub fn len(&self) -> Option<u64> {
        match self {
            WireBody::Empty => Some(0),
            WireBody::Bytes(bytes) => Some(bytes.len() as u64),
            WireBody::Stream(_) => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, WireBody::Empty)
    }

    /// Borrow the bytes of a fixed-size body.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            WireBody::Bytes(bytes) => Some(bytes),
            WireBody::Empty | WireBody::Stream(_) => None,
        }
    }
}

impl fmt::Debug for WireBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireBody::Empty => f.write_str("Empty"),
            WireBody::Bytes(bytes) => f
                .debug_tuple("Bytes")
                .field(&format!("{} bytes", bytes.len()))
                .finish(),
            WireBody::Stream(_) => f.debug_tuple("Stream").field(&"<BodyStream>").finish(),
        }
    }
}

/// Result of [`encode_body`]
#[derive(Debug)]
pub struct EncodedBody {
    /// Content type implied by the payload, if any
    pub content_type: Option<HeaderValue>,
    pub body: WireBody,
}

/// Turn a payload into wire bytes plus the content type it implies.
///
/// # Errors
///
/// Returns a serialization error if a JSON payload cannot be serialized.
pub fn encode_body(body: RequestBody) -> Result<EncodedBody> {
    let encoded = match body {
        RequestBody::Empty => EncodedBody {
            content_type: None,
            body: WireBody::Empty,
        },
        RequestBody::Json(value) => {
            let bytes = serde_json::to_vec(&value).map_err(error::serialization)?;
            EncodedBody {
                content_type: Some(HeaderValue::from_static("application/json")),
                body: WireBody::Bytes(Bytes::from(bytes)),
            }
        }
        RequestBody::Form(form) => {
            let (boundary, bytes) = form.encode();
            let content_type = HeaderValue::from_str(&format!("multipart/form-data; boundary={boundary}"))
                .map_err(error::builder)?;
            EncodedBody {
                content_type: Some(content_type),
                body: WireBody::Bytes(bytes),
            }
        }
        RequestBody::UrlEncoded(encoded) => EncodedBody {
            content_type: Some(HeaderValue::from_static("application/x-www-form-urlencoded")),
            body: WireBody::Bytes(Bytes::from(encoded)),
        },
        RequestBody::Bytes(bytes) => EncodedBody {
            content_type: None,
            body: WireBody::Bytes(bytes),
        },
        RequestBody::Stream(stream) => EncodedBody {
            content_type: None,
            body: WireBody::Stream(stream),
        },
        RequestBody::Text(text) => EncodedBody {
            content_type: None,
            body: WireBody::Bytes(Bytes::from(text)),
        },
    };
    Ok(encoded)
}
