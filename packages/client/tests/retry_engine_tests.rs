mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use common::{MockTransport, Reply};
use fetchkit_client::abort::AbortReason;
use fetchkit_client::{AbortController, FetchError, RetryError, RetryOptions, RetryPolicy, retry};
use tokio::time::Instant;

#[derive(Debug, PartialEq)]
struct Flaky(u32);

fn counter() -> Arc<AtomicU32> {
    Arc::new(AtomicU32::new(0))
}

fn no_jitter() -> RetryOptions<Flaky> {
    RetryOptions::new()
        .base_delay(Duration::from_millis(10))
        .jitter(false)
}

#[tokio::test(start_paused = true)]
async fn test_succeeds_after_k_failures() {
    for k in 0..=3u32 {
        let calls = counter();
        let seen = Arc::clone(&calls);

        let value = retry(
            move |ctx| {
                let call = seen.fetch_add(1, Ordering::SeqCst);
                assert_eq!(ctx.attempt, call);
                async move { if call < k { Err(Flaky(call)) } else { Ok("done") } }
            },
            no_jitter().max_retries(3),
        )
        .await;

        assert_eq!(value.ok(), Some("done"));
        assert_eq!(calls.load(Ordering::SeqCst), k + 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_makes_max_plus_one_attempts() {
    let calls = counter();
    let seen = Arc::clone(&calls);

    let err = retry(
        move |_ctx| {
            let call = seen.fetch_add(1, Ordering::SeqCst);
            async move { Err::<(), _>(Flaky(call)) }
        },
        no_jitter().max_retries(4),
    )
    .await
    .expect_err("never succeeds");

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_eq!(err.into_operation(), Some(Flaky(4)));
}

#[tokio::test(start_paused = true)]
async fn test_should_retry_false_stops_after_one_attempt() {
    let calls = counter();
    let seen = Arc::clone(&calls);

    let err = retry(
        move |_ctx| {
            seen.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Flaky(0)) }
        },
        no_jitter().max_retries(5).should_retry(|_| false),
    )
    .await
    .expect_err("not retryable");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!err.is_aborted());
}

#[tokio::test(start_paused = true)]
async fn test_backoff_waits_base_then_double() {
    let calls = counter();
    let seen = Arc::clone(&calls);
    let started = Instant::now();

    let err = retry(
        move |_ctx| {
            seen.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Flaky(0)) }
        },
        RetryOptions::new()
            .max_retries(2)
            .base_delay(Duration::from_millis(100))
            .jitter(false),
    )
    .await
    .expect_err("always fails");

    assert!(!err.is_aborted());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert!(started.elapsed() < Duration::from_millis(350));
}

#[tokio::test(start_paused = true)]
async fn test_delays_are_capped_at_max_delay() {
    let started = Instant::now();

    let _ = retry(
        |_ctx| async { Err::<(), _>(Flaky(0)) },
        RetryOptions::new()
            .max_retries(3)
            .base_delay(Duration::from_millis(400))
            .max_delay(Duration::from_millis(500))
            .jitter(false),
    )
    .await;

    // 400 + 500 + 500
    assert!(started.elapsed() >= Duration::from_millis(1400));
    assert!(started.elapsed() < Duration::from_millis(1450));
}

#[tokio::test(start_paused = true)]
async fn test_pre_aborted_signal_skips_action() {
    let controller = AbortController::new();
    controller.abort();
    let calls = counter();
    let seen = Arc::clone(&calls);

    let err = retry(
        move |_ctx| {
            seen.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Flaky>(()) }
        },
        no_jitter().signal(controller.signal()),
    )
    .await
    .expect_err("aborted up front");

    assert!(matches!(err, RetryError::Aborted(AbortReason::Aborted)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_abort_during_backoff_is_not_retried() {
    let controller = AbortController::new();
    let trigger = controller.clone();
    let calls = counter();
    let seen = Arc::clone(&calls);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.abort();
    });

    let err = retry(
        move |_ctx| {
            seen.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Flaky(0)) }
        },
        RetryOptions::new()
            .max_retries(5)
            .base_delay(Duration::from_secs(1))
            .jitter(false)
            .signal(controller.signal()),
    )
    .await
    .expect_err("aborted while sleeping");

    assert!(err.is_aborted());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_attempt_timeout_aborts_without_retry() {
    let calls = counter();
    let seen = Arc::clone(&calls);

    let err = retry(
        move |ctx| {
            seen.fetch_add(1, Ordering::SeqCst);
            async move {
                ctx.signal.cancelled().await;
                Err::<(), _>(Flaky(0))
            }
        },
        no_jitter()
            .max_retries(3)
            .attempt_timeout(Duration::from_millis(200)),
    )
    .await
    .expect_err("attempt timed out");

    assert!(matches!(err, RetryError::Aborted(AbortReason::TimedOut)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_attempt_signal_follows_external_signal() {
    let controller = AbortController::new();
    let trigger = controller.clone();

    let err = retry(
        move |ctx| {
            trigger.abort();
            async move {
                assert!(ctx.signal.is_aborted());
                Err::<(), _>(Flaky(0))
            }
        },
        no_jitter().max_retries(3).signal(controller.signal()),
    )
    .await
    .expect_err("aborted attempt");

    assert!(err.is_aborted());
}

#[tokio::test(start_paused = true)]
async fn test_retry_composes_with_requests() {
    let transport = MockTransport::new()
        .reply(Reply::status(503))
        .reply(Reply::Fail("connection reset"))
        .reply(Reply::json(200, r#"{"ok":true}"#));
    let client = transport.client();
    let options = client
        .retry_options()
        .policy(RetryPolicy {
            jitter: false,
            ..RetryPolicy::default()
        })
        .should_retry(FetchError::is_retryable);

    let body: serde_json::Value = retry(
        |ctx| {
            let pending = client.request(
                "https://api.example/flaky",
                fetchkit_client::RequestConfig::new().signal(ctx.signal),
            );
            async move { pending.json::<serde_json::Value>().await }
        },
        options,
    )
    .await
    .map_err(FetchError::from)
    .expect("third attempt succeeds");

    assert_eq!(body, serde_json::json!({"ok": true}));
    assert_eq!(transport.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_client_errors_are_not_retried_by_client_options() {
    let transport = MockTransport::new().always(Reply::status(404));
    let client = transport.client();

    let err = retry(
        |_ctx| client.get("https://api.example/missing").send(),
        client.retry_options(),
    )
    .await
    .map_err(FetchError::from)
    .expect_err("404 is final");

    assert_eq!(err.status(), Some(fetchkit_client::StatusCode::NOT_FOUND));
    assert_eq!(transport.calls(), 1);
}
