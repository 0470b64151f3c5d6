//! Terminal HTTP methods
//!
//! Each terminal method fixes the verb and URL and returns a
//! [`PendingRequest`]. Nothing is sent until it is awaited or one of its
//! body accessors is called.

use fetchkit_client::PendingRequest;
use http::Method;

use crate::builder::core::{BodyNotSet, BodySet, FetchBuilder};

impl<S> FetchBuilder<S> {
    /// Fix the method and URL and hand the call to the client.
    fn dispatch(self, method: Method, url: &str) -> PendingRequest {
        if self.debug_enabled {
            log::debug!("Fetch Builder: {method} {url}");
        }
        let config = self.config.method(method);
        match self.client {
            Some(client) => client.request(url, config),
            None => fetchkit_client::request(url, config),
        }
    }

    /// Send with an arbitrary method, e.g. `OPTIONS`.
    pub fn request(self, method: Method, url: &str) -> PendingRequest {
        self.dispatch(method, url)
    }
}

impl FetchBuilder<BodyNotSet> {
    /// Send a GET request.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchkit::FetchBuilder;
    ///
    /// # async fn run() -> fetchkit::Result<()> {
    /// let body = FetchBuilder::new().get("https://api.example.com/health").text().await?;
    /// # let _ = body;
    /// # Ok(())
    /// # }
    /// ```
    pub fn get(self, url: &str) -> PendingRequest {
        self.dispatch(Method::GET, url)
    }

    pub fn head(self, url: &str) -> PendingRequest {
        self.dispatch(Method::HEAD, url)
    }

    pub fn delete(self, url: &str) -> PendingRequest {
        self.dispatch(Method::DELETE, url)
    }
}

impl FetchBuilder<BodySet> {
    pub fn post(self, url: &str) -> PendingRequest {
        self.dispatch(Method::POST, url)
    }

    pub fn put(self, url: &str) -> PendingRequest {
        self.dispatch(Method::PUT, url)
    }

    pub fn patch(self, url: &str) -> PendingRequest {
        self.dispatch(Method::PATCH, url)
    }
}
