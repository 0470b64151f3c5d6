//! Per-call options: query, cancellation, progress and hooks

use std::future::Future;

use fetchkit_client::{
    AbortSignal, BoxError, Progress, Query, QueryValue, RequestParams, RequestSnapshot, Response,
};

use crate::builder::core::FetchBuilder;

impl<S> FetchBuilder<S> {
    /// Set a query parameter; list values become repeated keys.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchkit::FetchBuilder;
    ///
    /// // https://api.example.com/x?a=1&b=2&b=3
    /// let pending = FetchBuilder::new()
    ///     .query("a", 1)
    ///     .query("b", [2, 3])
    ///     .get("https://api.example.com/x");
    /// ```
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.config = self.config.query_param(key, value);
        self
    }

    /// Replace the whole query.
    #[must_use]
    pub fn query_all(mut self, query: Query) -> Self {
        self.config = self.config.query(query);
        self
    }

    /// Abort the call when `signal` fires.
    #[must_use]
    pub fn signal(mut self, signal: AbortSignal) -> Self {
        self.config = self.config.signal(signal);
        self
    }

    /// Report download progress for every body chunk.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.config = self.config.on_progress(callback);
        self
    }

    /// Rewrite the query and headers just before dispatch.
    #[must_use]
    pub fn before_hook<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(RequestParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestParams, BoxError>> + Send + 'static,
    {
        self.config = self.config.before_hook(hook);
        self
    }

    /// Inspect or replace the response before it is classified.
    #[must_use]
    pub fn after_hook<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Response, RequestSnapshot) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, BoxError>> + Send + 'static,
    {
        self.config = self.config.after_hook(hook);
        self
    }
}
