//! Request orchestration
//!
//! One call moves through these stages, and leaves at the first failure:
//!
//! 1. build: merge headers, encode the body, set up the cancellation scope
//! 2. before-hook: may replace the query and headers
//! 3. dispatch: encode the query onto the URL and hand the request to the transport
//! 4. after-hook: may replace the response
//! 5. settle: 2xx responses are returned, anything else becomes a `FetchError`
//!
//! Stages 2 to 5 run inside the call's `CallGuard`, so the caller's signal
//! and the timeout are observed at every await point, including body reads
//! after the response has been returned.

use http::header::{CONTENT_TYPE, HeaderValue, USER_AGENT};
use url::Url;

use super::core::FetchClient;
use crate::abort::{AbortController, CallGuard, Deadline};
use crate::error::body::read_error_body;
use crate::error::{self, Result};
use crate::http::request::merge_headers;
use crate::http::{
    EncodedBody, RequestConfig, RequestParams, RequestSnapshot, Response, encode_body, encode_query,
    with_progress,
};

/// Run one call to completion and record its outcome in the client stats.
pub(crate) async fn execute(client: FetchClient, url: String, config: RequestConfig) -> Result<Response> {
    client.stats.record_request();
    let outcome = orchestrate(&client, url, config).await;
    match &outcome {
        Ok(_) => client.stats.record_success(),
        Err(err) => client.stats.record_failure(err),
    }
    outcome
}

async fn orchestrate(client: &FetchClient, url: String, config: RequestConfig) -> Result<Response> {
    let RequestConfig {
        method,
        query,
        body,
        headers: call_headers,
        timeout,
        signal,
        on_progress,
        before_hook,
        after_hook,
        pending_error,
    } = config;

    if let Some(err) = pending_error {
        return Err(err);
    }

    let mut headers = client.config.default_headers.clone();
    merge_headers(&mut headers, call_headers);
    if !headers.contains_key(USER_AGENT) {
        if let Ok(agent) = HeaderValue::from_str(&client.config.user_agent) {
            headers.insert(USER_AGENT, agent);
        }
    }

    let EncodedBody { content_type, body } = encode_body(body)?;
    if let Some(content_type) = content_type {
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, content_type);
        }
    }

    let guard = CallGuard::new(
        AbortController::follow(signal),
        Deadline::after(timeout.or(client.config.timeout)),
    );

    let mut params = RequestParams { query, headers };
    if let Some(hook) = before_hook {
        tracing::debug!(url = %url, "running before hook");
        params = guard
            .run(hook(params))
            .await
            .map_err(error::aborted)?
            .map_err(error::hook)?;
    }

    let RequestParams { query, headers } = params;
    let target = encode_query(&url, &query);
    let url = Url::parse(&target).map_err(error::builder)?;

    if let Some(reason) = guard.reason() {
        tracing::debug!(url = %url, ?reason, "signal aborted before dispatch");
        return Err(error::aborted(reason).with_url(url));
    }

    let uri: http::Uri = url
        .as_str()
        .parse()
        .map_err(|e| error::builder(e).with_url(url.clone()))?;
    let mut request = http::Request::new(body);
    *request.method_mut() = method.clone();
    *request.uri_mut() = uri;
    *request.headers_mut() = headers.clone();
    if let Some(len) = request.body().len() {
        client.stats.record_bytes_sent(len);
    }
    let snapshot = RequestSnapshot {
        method,
        url: url.clone(),
        headers,
    };

    tracing::debug!(
        method = %snapshot.method,
        url = %url,
        transport = client.transport.name(),
        "dispatching request"
    );
    let dispatched = guard
        .run(client.transport.fetch(request, guard.signal()))
        .await
        .map_err(|reason| error::aborted(reason).with_url(url.clone()))?;
    let transport_response = match dispatched {
        Ok(response) => response,
        Err(source) => {
            if let Some(reason) = guard.reason() {
                tracing::debug!(url = %url, ?reason, "transport stopped by abort");
                return Err(error::aborted(reason).with_url(url));
            }
            tracing::warn!(url = %url, error = %source, "transport failed");
            return Err(error::network(source).with_url(url));
        }
    };

    let mut response = Response::from_transport(transport_response, url.clone()).guarded(guard.clone());
    if let Some(callback) = on_progress {
        response = with_progress(response, callback);
    }

    if let Some(hook) = after_hook {
        tracing::debug!(url = %url, status = %response.status(), "running after hook");
        response = guard
            .run(hook(response, snapshot))
            .await
            .map_err(|reason| error::aborted(reason).with_url(url.clone()))?
            .map_err(|source| error::hook(source).with_url(url.clone()))?;
    }

    if response.ok() {
        tracing::debug!(url = %url, status = %response.status(), "request succeeded");
        return Ok(response);
    }

    let status = response.status();
    let status_text = response.status_text().to_string();
    let final_url = response.url().clone();
    let body = read_error_body(response).await;
    if body.is_none() {
        if let Some(reason) = guard.reason() {
            return Err(error::aborted(reason).with_url(final_url));
        }
    }

    tracing::warn!(url = %final_url, %status, "request failed with HTTP status");
    Err(error::http_status(final_url, status, status_text, body))
}
