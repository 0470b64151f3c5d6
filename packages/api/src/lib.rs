//! # fetchkit
//!
//! Ergonomic fetch-style HTTP calls on top of [`fetchkit_client`].
//!
//! ```no_run
//! use fetchkit::Fetch;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct NewUser<'a> {
//!     name: &'a str,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//! }
//!
//! # async fn run() -> fetchkit::Result<()> {
//! let user: User = Fetch::json()
//!     .bearer_auth("token")
//!     .body(&NewUser { name: "Ada" })
//!     .post("https://api.example.com/users")
//!     .json()
//!     .await?;
//! # let _ = user.id;
//! # Ok(())
//! # }
//! ```
//!
//! Calls can be wrapped in [`retry`] for exponential backoff:
//!
//! ```no_run
//! use fetchkit::{FetchError, RetryOptions, retry};
//!
//! # async fn run() -> fetchkit::Result<()> {
//! let text = retry(
//!     |ctx| fetchkit::Fetch::builder().signal(ctx.signal).get("https://api.example.com/flaky").text(),
//!     RetryOptions::new().max_retries(3).should_retry(FetchError::is_retryable),
//! )
//! .await?;
//! # let _ = text;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;

pub use builder::{AcceptValue, BodyNotSet, BodySet, ContentType, FetchBuilder, header};

// Re-export the client surface so most users need a single dependency
pub use fetchkit_client::prelude::*;
pub use fetchkit_client::{global_client, global_stats, init_global_client, request};

/// Entry points for building requests
pub struct Fetch;

impl Fetch {
    /// Builder using the process-wide client.
    #[must_use]
    pub fn builder() -> FetchBuilder {
        FetchBuilder::new()
    }

    /// Builder for JSON APIs.
    #[must_use]
    pub fn json() -> FetchBuilder {
        FetchBuilder::json()
    }

    /// Builder that url-encodes bodies.
    #[must_use]
    pub fn form_urlencoded() -> FetchBuilder {
        FetchBuilder::form_urlencoded()
    }

    /// Builder sending through `client`.
    #[must_use]
    pub fn with_client(client: &FetchClient) -> FetchBuilder {
        FetchBuilder::with_client(client)
    }
}

#[must_use]
pub fn json() -> FetchBuilder {
    FetchBuilder::json()
}

#[must_use]
pub fn form() -> FetchBuilder {
    FetchBuilder::form_urlencoded()
}

#[must_use]
pub fn with_client(client: &FetchClient) -> FetchBuilder {
    FetchBuilder::with_client(client)
}

/// GET `url` with the process-wide client.
pub fn get(url: &str) -> PendingRequest {
    FetchBuilder::new().get(url)
}

/// DELETE `url` with the process-wide client.
pub fn delete(url: &str) -> PendingRequest {
    FetchBuilder::new().delete(url)
}
