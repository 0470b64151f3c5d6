//! HTTP request and response types
//!
//! This module holds everything a single call is made of: the query and
//! body encoders, per-call configuration and hooks, the normalized
//! response with its single-read body, and download progress tracking.

pub mod body;
pub mod multipart;
pub mod progress;
pub mod query;
pub mod request;
pub mod response;

pub use body::{BodyStream, EncodedBody, RequestBody, WireBody, encode_body};
pub use multipart::{FormData, Part, PartValue};
pub use progress::{Progress, ProgressCallback, ProgressStream, with_progress};
pub use query::{Query, QueryValue, encode_query};
pub use request::{AfterHook, BeforeHook, RequestConfig, RequestParams, RequestSnapshot};
pub use response::{Blob, Body, Response};
