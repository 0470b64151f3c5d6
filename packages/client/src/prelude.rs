//! fetchkit prelude
//!
//! The types needed for everyday calls. Only canonical types that are part
//! of the public API belong here.

// Cancellation
pub use crate::abort::{AbortController, AbortReason, AbortSignal};

// Core client for making requests
pub use crate::client::{ClientStats, ClientStatsSnapshot, FetchClient, PendingRequest};
pub use crate::config::ClientConfig;

// Error types
pub use crate::error::{BoxError, ErrorBody, FetchError, Kind, Result};

// Request and response types
pub use crate::http::{
    Blob, Body, FormData, Progress, Query, QueryValue, RequestBody, RequestConfig, RequestParams,
    RequestSnapshot, Response,
};

// Connectivity
pub use crate::monitor::{MonitorConfig, NetworkMonitor};

// Retry engine
pub use crate::retry::{RetryContext, RetryError, RetryOptions, RetryPolicy, retry};

// Transports
pub use crate::transport::{HyperTransport, Transport};

// HTTP standard types from http crate
pub use ::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

// URL handling
pub use url::Url;
