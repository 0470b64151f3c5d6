mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{MockTransport, Reply};
use fetchkit_client::abort::AbortReason;
use fetchkit_client::http::FormData;
use fetchkit_client::{
    AbortController, ClientConfig, ErrorBody, FetchClient, HeaderMap, HeaderValue, Method, Query,
    RequestConfig, RequestParams, Response, StatusCode,
};

#[tokio::test]
async fn test_query_is_encoded_onto_url() {
    let transport = MockTransport::new();
    let config = RequestConfig::new().query(Query::new().with("a", 1).with("b", vec![2, 3]));

    transport
        .client()
        .request("https://api.example/x", config)
        .await
        .expect("200 response");

    assert_eq!(transport.last().uri, "https://api.example/x?a=1&b=2&b=3");
}

#[tokio::test]
async fn test_pre_aborted_signal_never_reaches_transport() {
    let transport = MockTransport::new();
    let controller = AbortController::new();
    controller.abort();

    let err = transport
        .client()
        .request("https://api.example/x", RequestConfig::new().signal(controller.signal()))
        .await
        .expect_err("aborted before dispatch");

    assert!(err.is_abort());
    assert!(!err.is_timeout());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_aborts_transport_signal() {
    let transport = MockTransport::new().reply(Reply::Hang);

    let err = transport
        .client()
        .request(
            "https://api.example/slow",
            RequestConfig::new().timeout(Duration::from_millis(250)),
        )
        .await
        .expect_err("request should time out");

    assert!(err.is_abort());
    assert!(err.is_timeout());
    let seen = transport.last();
    assert!(seen.signal.is_aborted());
    assert_eq!(seen.signal.reason(), Some(AbortReason::TimedOut));
}

#[tokio::test(start_paused = true)]
async fn test_client_default_timeout_applies() {
    let transport = MockTransport::new().reply(Reply::Hang);
    let client = FetchClient::with_transport_and_config(
        transport.clone(),
        ClientConfig::new().timeout(Duration::from_secs(1)),
    );

    let err = client
        .get("https://api.example/slow")
        .await
        .expect_err("client timeout applies");
    assert!(err.is_timeout());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_also_guards_body_reads() {
    let transport = MockTransport::new().reply(Reply::Stall {
        status: 200,
        first: b"partial",
    });

    let response = transport
        .client()
        .request(
            "https://api.example/stream",
            RequestConfig::new().timeout(Duration::from_millis(500)),
        )
        .await
        .expect("headers arrive before the deadline");

    let err = response.bytes().await.expect_err("body never completes");
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_abort_during_body_read_settles_as_abort() {
    let transport = MockTransport::new().reply(Reply::Stall {
        status: 200,
        first: b"partial",
    });
    let controller = AbortController::new();

    let response = transport
        .client()
        .request(
            "https://api.example/stream",
            RequestConfig::new().signal(controller.signal()),
        )
        .await
        .expect("headers arrive before the abort");

    let read = tokio::spawn(response.bytes());
    tokio::task::yield_now().await;
    controller.abort();

    let err = read
        .await
        .expect("read task completes")
        .expect_err("body read was aborted");
    assert!(err.is_abort());
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_broken_body_stream_is_body_error() {
    let transport = MockTransport::new().reply(Reply::Broken {
        status: 200,
        first: b"partial",
        error: "connection reset mid-body",
    });

    let response = transport
        .client()
        .get("https://api.example/download")
        .await
        .expect("headers arrive intact");

    let err = response.bytes().await.expect_err("body stream fails");
    assert!(err.is_body());
    assert!(!err.is_abort());
    assert!(!err.is_network());
}

#[tokio::test]
async fn test_abort_during_flight_settles_as_abort() {
    let transport = MockTransport::new().reply(Reply::Hang);
    let controller = AbortController::new();
    let pending = transport
        .client()
        .request("https://api.example/x", RequestConfig::new().signal(controller.signal()));

    let call = tokio::spawn(pending.send());
    tokio::task::yield_now().await;
    controller.abort();

    let err = call
        .await
        .expect("call task completes")
        .expect_err("call was aborted");
    assert!(err.is_abort());
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_not_found_carries_parsed_json_body() {
    let transport = MockTransport::new().reply(Reply::json(404, r#"{"message":"no such user"}"#));

    let err = transport
        .client()
        .get("https://api.example/users/7")
        .await
        .expect_err("404 is a failure");

    assert!(err.is_status());
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.status_text(), Some("Not Found"));
    assert_eq!(
        err.url().map(|url| url.as_str()),
        Some("https://api.example/users/7")
    );
    let body = err.body().and_then(ErrorBody::as_json).expect("json body attached");
    assert_eq!(body["message"], "no such user");
}

#[tokio::test]
async fn test_unparsable_json_error_body_is_omitted() {
    let transport = MockTransport::new().reply(Reply::json(500, "<html>oops</html>"));

    let err = transport
        .client()
        .get("https://api.example/x")
        .await
        .expect_err("500 is a failure");

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(err.body().is_none());
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_text_error_body_is_kept() {
    let transport = MockTransport::new().reply(Reply::Respond {
        status: 503,
        headers: vec![("content-type", "text/plain")],
        chunks: vec![&b"maintenance"[..]],
    });

    let err = transport
        .client()
        .get("https://api.example/x")
        .await
        .expect_err("503 is a failure");

    assert_eq!(err.body().and_then(ErrorBody::as_text), Some("maintenance"));
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    let transport = MockTransport::new().reply(Reply::Fail("connection refused"));

    let err = transport
        .client()
        .get("https://api.example/x")
        .await
        .expect_err("transport failed");

    assert!(err.is_network());
    assert!(err.status().is_none());
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_invalid_url_is_builder_error() {
    let transport = MockTransport::new();

    let err = transport
        .client()
        .get("not a url")
        .await
        .expect_err("relative garbage is rejected");

    assert!(err.is_builder());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_progress_reports_prefix_sums() {
    let transport = MockTransport::new().reply(Reply::Respond {
        status: 200,
        headers: vec![("content-length", "10")],
        chunks: vec![&b"abc"[..], &b"d"[..], &b"efghij"[..]],
    });
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let body = transport
        .client()
        .request(
            "https://api.example/file",
            RequestConfig::new().on_progress(move |progress| {
                sink.lock().expect("progress sink poisoned").push(progress);
            }),
        )
        .bytes()
        .await
        .expect("body reads");

    assert_eq!(body.len(), 10);
    let seen = seen.lock().expect("progress sink poisoned");
    assert_eq!(seen.iter().map(|p| p.loaded).collect::<Vec<_>>(), vec![3, 4, 10]);
    assert!(seen.iter().all(|p| p.total == Some(10)));
    assert_eq!(seen.last().and_then(|p| p.fraction), Some(1.0));
}

#[tokio::test]
async fn test_json_body_sets_content_type() {
    let transport = MockTransport::new();

    transport
        .client()
        .request(
            "https://api.example/posts",
            RequestConfig::new()
                .method(Method::POST)
                .json(&serde_json::json!({"title": "hello"})),
        )
        .await
        .expect("200 response");

    let seen = transport.last();
    assert_eq!(seen.method, Method::POST);
    assert_eq!(seen.headers["content-type"], "application/json");
    let sent: serde_json::Value =
        serde_json::from_slice(&seen.body.expect("json body sent")).expect("valid json sent");
    assert_eq!(sent, serde_json::json!({"title": "hello"}));
}

#[tokio::test]
async fn test_explicit_content_type_is_not_overwritten() {
    let transport = MockTransport::new();

    transport
        .client()
        .request(
            "https://api.example/posts",
            RequestConfig::new()
                .method(Method::POST)
                .header("content-type", "application/vnd.api+json")
                .json(&serde_json::json!({"data": null})),
        )
        .await
        .expect("200 response");

    assert_eq!(
        transport.last().headers["content-type"],
        "application/vnd.api+json"
    );
}

#[tokio::test]
async fn test_multipart_body_declares_boundary() {
    let transport = MockTransport::new();
    let form = FormData::new().text("name", "fetchkit");

    transport
        .client()
        .request(
            "https://api.example/upload",
            RequestConfig::new().method(Method::POST).body(form),
        )
        .await
        .expect("200 response");

    let seen = transport.last();
    let content_type = seen.headers["content-type"].to_str().expect("ascii header");
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("boundary parameter");
    let body = seen.body.expect("multipart body sent");
    assert!(body.starts_with(format!("--{boundary}\r\n").as_bytes()));
}

#[tokio::test]
async fn test_default_headers_merge_under_call_headers() {
    let transport = MockTransport::new();
    let mut defaults = HeaderMap::new();
    defaults.insert("x-client", HeaderValue::from_static("fetchkit"));
    defaults.insert("accept", HeaderValue::from_static("*/*"));
    let client = FetchClient::with_transport_and_config(
        transport.clone(),
        ClientConfig::new().default_headers(defaults).user_agent("probe/1.0"),
    );

    client
        .request(
            "https://api.example/x",
            RequestConfig::new().header("accept", "application/json"),
        )
        .await
        .expect("200 response");

    let headers = transport.last().headers;
    assert_eq!(headers["x-client"], "fetchkit");
    assert_eq!(headers["accept"], "application/json");
    assert_eq!(headers["user-agent"], "probe/1.0");
}

#[tokio::test]
async fn test_before_hook_replaces_query_and_headers() {
    let transport = MockTransport::new();

    transport
        .client()
        .request(
            "https://api.example/x",
            RequestConfig::new()
                .query_param("page", 1)
                .before_hook(|params: RequestParams| async move {
                    let mut query = params.query.clone();
                    query.set("page", 2);
                    query.set("token", "abc");
                    let mut headers = params.headers;
                    headers.insert("x-signed", HeaderValue::from_static("yes"));
                    Ok(RequestParams { query, headers })
                }),
        )
        .await
        .expect("200 response");

    let seen = transport.last();
    assert_eq!(seen.uri, "https://api.example/x?page=2&token=abc");
    assert_eq!(seen.headers["x-signed"], "yes");
}

#[tokio::test]
async fn test_before_hook_error_skips_transport() {
    let transport = MockTransport::new();

    let err = transport
        .client()
        .request(
            "https://api.example/x",
            RequestConfig::new()
                .before_hook(|_params| async move { Err("missing credentials".into()) }),
        )
        .await
        .expect_err("hook failure propagates");

    assert!(err.is_hook());
    assert_eq!(
        std::error::Error::source(&err).map(ToString::to_string),
        Some("missing credentials".to_string())
    );
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_after_hook_replacement_is_returned() {
    let transport = MockTransport::new().reply(Reply::status(500));

    let response = transport
        .client()
        .request(
            "https://api.example/x",
            RequestConfig::new().after_hook(|response: Response, request| async move {
                assert_eq!(request.url.as_str(), "https://api.example/x");
                Ok(response
                    .with_status(StatusCode::OK)
                    .map_body(|_| fetchkit_client::Body::from_bytes("recovered")))
            }),
        )
        .await
        .expect("hook turned the failure into a success");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("text body"), "recovered");
}

#[tokio::test]
async fn test_after_hook_error_is_hook_error_with_url() {
    let transport = MockTransport::new().reply(Reply::status(200));

    let err = transport
        .client()
        .request(
            "https://api.example/x",
            RequestConfig::new()
                .after_hook(|_response: Response, _request| async { Err("nope".into()) }),
        )
        .await
        .expect_err("hook rejected the response");

    assert!(err.is_hook());
    assert_eq!(err.url().map(|url| url.as_str()), Some("https://api.example/x"));
    assert_eq!(
        std::error::Error::source(&err).map(ToString::to_string),
        Some("nope".to_string())
    );
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_json_accessor_deserializes_body() {
    let transport = MockTransport::new().reply(Reply::json(200, r#"{"id":42,"name":"Ada"}"#));

    #[derive(serde::Deserialize)]
    struct User {
        id: u32,
        name: String,
    }

    let user: User = transport
        .client()
        .get("https://api.example/users/42")
        .json()
        .await
        .expect("json body");

    assert_eq!(user.id, 42);
    assert_eq!(user.name, "Ada");
}

#[tokio::test]
async fn test_stats_count_outcomes() {
    let transport = MockTransport::new()
        .reply(Reply::status(200))
        .reply(Reply::status(404))
        .reply(Reply::Fail("reset"));
    let client = transport.client();

    let _ = client.get("https://api.example/a").await;
    let _ = client.get("https://api.example/b").await;
    let _ = client.get("https://api.example/c").await;

    let stats = client.stats().snapshot();
    assert_eq!(stats.requests_total, 3);
    assert_eq!(stats.requests_successful, 1);
    assert_eq!(stats.requests_http_failed, 1);
    assert_eq!(stats.requests_network_failed, 1);
}
