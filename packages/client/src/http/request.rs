//! Per-call request configuration and hooks

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde::Serialize;
use url::Url;

use super::body::RequestBody;
use super::progress::{Progress, ProgressCallback};
use super::query::{Query, QueryValue};
use super::response::Response;
use crate::abort::AbortSignal;
use crate::error::{self, BoxError, FetchError};

/// The parts of a request a before-hook may rewrite
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pub query: Query,
    pub headers: HeaderMap,
}

/// Read-only view of the request that produced a response
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

/// Hook run before dispatch; its output replaces the query and headers
pub type BeforeHook =
    Arc<dyn Fn(RequestParams) -> BoxFuture<'static, Result<RequestParams, BoxError>> + Send + Sync>;

/// Hook run on the response; its output replaces the response
pub type AfterHook = Arc<
    dyn Fn(Response, RequestSnapshot) -> BoxFuture<'static, Result<Response, BoxError>>
        + Send
        + Sync,
>;

/// Options for a single call
///
/// Setters never fail. Invalid input, such as a header value with control
/// characters, is remembered and reported when the call is executed.
#[derive(Default)]
pub struct RequestConfig {
    pub(crate) method: Method,
    pub(crate) query: Query,
    pub(crate) body: RequestBody,
    pub(crate) headers: HeaderMap,
    pub(crate) timeout: Option<Duration>,
    pub(crate) signal: Option<AbortSignal>,
    pub(crate) on_progress: Option<ProgressCallback>,
    pub(crate) before_hook: Option<BeforeHook>,
    pub(crate) after_hook: Option<AfterHook>,
    pub(crate) pending_error: Option<FetchError>,
}

impl RequestConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replace the whole query.
    #[must_use]
    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Set a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.set(key, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as the JSON body.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match RequestBody::json(value) {
            Ok(body) => self.body = body,
            Err(err) => self.record(err),
        }
        self
    }

    /// Url-encode `value` as an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match RequestBody::url_encoded(value) {
            Ok(body) => self.body = body,
            Err(err) => self.record(err),
        }
        self
    }

    /// Set a header, replacing earlier values with the same name.
    #[must_use]
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        let name = HeaderName::try_from(key).map_err(Into::into);
        let value = HeaderValue::try_from(value).map_err(Into::into);
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(err), _) | (_, Err(err)) => self.record(error::builder(err)),
        }
        self
    }

    /// Merge `headers` in, replacing values with the same name.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        merge_headers(&mut self.headers, headers);
        self
    }

    /// Abort the call if it has not settled after `timeout`. Zero disables it.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn before_hook<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(RequestParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestParams, BoxError>> + Send + 'static,
    {
        self.before_hook = Some(Arc::new(move |params| hook(params).boxed()));
        self
    }

    #[must_use]
    pub fn after_hook<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Response, RequestSnapshot) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, BoxError>> + Send + 'static,
    {
        self.after_hook = Some(Arc::new(move |response, request| hook(response, request).boxed()));
        self
    }

    /// The method this call will use.
    #[must_use]
    pub fn get_method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn get_headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn get_query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// First recorded setter error, if any.
    #[must_use]
    pub fn pending_error(&self) -> Option<&FetchError> {
        self.pending_error.as_ref()
    }

    fn record(&mut self, err: FetchError) {
        if self.pending_error.is_none() {
            self.pending_error = Some(err);
        }
    }
}

/// Merge `source` into `target`. A name present in `source` replaces all of
/// its values in `target`; repeated names in `source` are all kept.
pub(crate) fn merge_headers(target: &mut HeaderMap, source: HeaderMap) {
    let mut last: Option<HeaderName> = None;
    for (name, value) in source {
        if let Some(name) = name {
            target.insert(name.clone(), value);
            last = Some(name);
        } else if let Some(name) = last.as_ref() {
            target.append(name.clone(), value);
        }
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("method", &self.method)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("signal", &self.signal.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .field("before_hook", &self.before_hook.is_some())
            .field("after_hook", &self.after_hook.is_some())
            .field("pending_error", &self.pending_error)
            .finish()
    }
}
