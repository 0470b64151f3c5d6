//! Best-effort decoding of failed response bodies
//!
//! Nothing in here returns an error: a body that cannot be read or parsed
//! is simply left off the `FetchError`.

use http::header::CONTENT_TYPE;

use super::types::ErrorBody;
use crate::http::Response;

/// Parse JSON, treating empty input, invalid JSON and a literal `null` as absent.
///
/// # Examples
/// ```
/// use fetchkit_client::error::parse_json_lenient;
///
/// assert_eq!(parse_json_lenient(br#"{"a":1}"#), Some(serde_json::json!({"a": 1})));
/// assert_eq!(parse_json_lenient(b"not json"), None);
/// assert_eq!(parse_json_lenient(b"null"), None);
/// assert_eq!(parse_json_lenient(b""), None);
/// ```
#[must_use]
pub fn parse_json_lenient(data: &[u8]) -> Option<serde_json::Value> {
    if data.is_empty() {
        return None;
    }
    match serde_json::from_slice::<serde_json::Value>(data) {
        Ok(serde_json::Value::Null) | Err(_) => None,
        Ok(value) => Some(value),
    }
}

/// Read and decode the body of a non-success response.
///
/// JSON content types are parsed as JSON; anything else is kept as text
/// when non-empty. Read failures and parse failures yield `None`.
pub(crate) async fn read_error_body(response: Response) -> Option<ErrorBody> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("application/json"));

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::debug!(%error, "discarding unreadable error body");
            return None;
        }
    };

    if is_json {
        return parse_json_lenient(&bytes).map(ErrorBody::Json);
    }

    if bytes.is_empty() {
        return None;
    }
    Some(ErrorBody::Text(String::from_utf8_lossy(&bytes).into_owned()))
}
