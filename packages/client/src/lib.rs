//! # fetchkit client
//!
//! Fetch-style HTTP calls with hooks, timeouts, cancellation, download
//! progress and classified failures, plus a retry engine with exponential
//! backoff that works with any async operation.
//!
//! ## Features
//!
//! - **Query and body encoding** for scalars, lists, JSON, url-encoded and multipart forms
//! - **Before and after hooks** that receive owned copies and return replacements
//! - **Cancellation** through `AbortController`/`AbortSignal`, composable with timeouts
//! - **Download progress** reported per chunk without buffering
//! - **Classified errors**: HTTP status, abort, network, serialization
//! - **Retry with backoff and jitter**, independent of HTTP
//! - **Pluggable transport**, hyper and rustls by default
//!
//! ## Usage
//!
//! ```no_run
//! use fetchkit_client::{Query, RequestConfig, request};
//!
//! # async fn run() -> fetchkit_client::Result<()> {
//! let config = RequestConfig::new().query(Query::new().with("a", 1).with("b", [2, 3]));
//! let users: serde_json::Value = request("https://api.example/x", config).json().await?;
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

use std::sync::OnceLock;

pub mod abort;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod monitor;
pub mod retry;
pub mod transport;

pub mod prelude;

pub use crate::prelude::*;

/// Process-wide client used by [`request`]
static GLOBAL_CLIENT: OnceLock<FetchClient> = OnceLock::new();

/// Get the global client, creating it with the default configuration on first use.
///
/// # Errors
///
/// Returns a builder error if the default transport cannot be created.
pub fn global_client() -> Result<FetchClient> {
    if let Some(client) = GLOBAL_CLIENT.get() {
        return Ok(client.clone());
    }
    let client = FetchClient::new()?;
    Ok(GLOBAL_CLIENT.get_or_init(|| client).clone())
}

/// Initialize the global client with custom configuration
///
/// Invalid configuration, or a global client that already exists, is
/// logged and the existing or default client stays in use.
pub fn init_global_client(config: ClientConfig) {
    let client = match FetchClient::with_config(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(
                "Failed to initialize HTTP client with custom config: {}, using default client",
                e
            );
            return;
        }
    };
    if GLOBAL_CLIENT.set(client).is_err() {
        tracing::error!("Global client already initialized, keeping the existing one");
    }
}

/// Statistics of the global client, if it has been created.
#[must_use]
pub fn global_stats() -> Option<ClientStatsSnapshot> {
    GLOBAL_CLIENT.get().map(|client| client.stats().snapshot())
}

/// Prepare a call to `url` through the global client.
pub fn request(url: impl Into<String>, config: RequestConfig) -> PendingRequest {
    PendingRequest::new(global_client(), url.into(), config)
}
