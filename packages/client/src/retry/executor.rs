//! Retry loop for arbitrary async operations
//!
//! The loop knows nothing about HTTP. Each attempt gets a fresh cancellation
//! scope that follows the caller's signal and carries the per-attempt
//! deadline; the scope and its timer are dropped before the next attempt.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::RetryPolicy;
use crate::abort::{AbortController, AbortReason, AbortSignal, CallGuard, Deadline};
use crate::error::{self, FetchError};

/// Per-attempt information handed to the retried action
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Zero-based attempt index
    pub attempt: u32,
    /// Aborts when the caller's signal does or the attempt times out
    pub signal: AbortSignal,
}

/// Decides whether a failed attempt should be retried
pub type ShouldRetry<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Options for [`retry`]
pub struct RetryOptions<E> {
    pub policy: RetryPolicy,
    should_retry: Option<ShouldRetry<E>>,
    signal: Option<AbortSignal>,
}

impl<E> Default for RetryOptions<E> {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
            should_retry: None,
            signal: None,
        }
    }
}

impl<E> Clone for RetryOptions<E> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy,
            should_retry: self.should_retry.clone(),
            signal: self.signal.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("policy", &self.policy)
            .field("should_retry", &self.should_retry.is_some())
            .field("signal", &self.signal)
            .finish()
    }
}

impl<E> RetryOptions<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.policy.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.policy.base_delay = base_delay;
        self
    }

    #[must_use]
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.policy.max_delay = max_delay;
        self
    }

    #[must_use]
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.policy.jitter = jitter;
        self
    }

    #[must_use]
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.policy.attempt_timeout = Some(timeout);
        self
    }

    /// Only retry failures for which `predicate` returns true.
    #[must_use]
    pub fn should_retry<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Some(Arc::new(predicate));
        self
    }

    /// Stop retrying, and abort the running attempt, once `signal` aborts.
    #[must_use]
    pub fn signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    fn wants_retry(&self, error: &E) -> bool {
        self.should_retry
            .as_ref()
            .is_none_or(|predicate| predicate(error))
    }
}

/// Final failure of [`retry`]
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// The caller's signal or an attempt timeout ended the loop
    #[error("retry aborted: {0}")]
    Aborted(#[source] AbortReason),
    /// The last attempt's own error
    #[error(transparent)]
    Operation(E),
}

impl<E> RetryError<E> {
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, RetryError::Aborted(_))
    }

    /// The operation's error, if the loop did not end in an abort.
    #[must_use]
    pub fn into_operation(self) -> Option<E> {
        match self {
            RetryError::Aborted(_) => None,
            RetryError::Operation(error) => Some(error),
        }
    }
}

impl From<RetryError<FetchError>> for FetchError {
    fn from(error: RetryError<FetchError>) -> Self {
        match error {
            RetryError::Aborted(reason) => error::aborted(reason),
            RetryError::Operation(error) => error,
        }
    }
}

/// Run `action` until it succeeds, the retry budget is spent, or the loop is aborted.
///
/// Attempt `n` (0-based) that fails with a retryable error is followed by a
/// wait of [`RetryPolicy::calculate_delay`]`(n + 1)`. Aborts are never retried.
///
/// # Errors
///
/// - [`RetryError::Aborted`] if the caller's signal was already aborted,
///   aborts during an attempt or a wait, or an attempt times out.
/// - [`RetryError::Operation`] with the last error once retries are
///   exhausted or `should_retry` rejects an error.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use fetchkit_client::retry::{RetryOptions, retry};
///
/// # tokio_test_block_on(async {
/// let mut calls = 0;
/// let value = retry(
///     |_ctx| {
///         calls += 1;
///         let outcome = if calls < 3 { Err("flaky") } else { Ok(calls) };
///         async move { outcome }
///     },
///     RetryOptions::new().base_delay(Duration::from_millis(1)).jitter(false),
/// )
/// .await;
/// assert_eq!(value.ok(), Some(3));
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
/// # }
/// ```
pub async fn retry<T, E, F, Fut>(mut action: F, options: RetryOptions<E>) -> Result<T, RetryError<E>>
where
    F: FnMut(RetryContext) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let external = options.signal.clone();
    if let Some(reason) = external.as_ref().and_then(AbortSignal::reason) {
        tracing::debug!(?reason, "retry signal aborted before the first attempt");
        return Err(RetryError::Aborted(reason));
    }

    let mut attempt = 0u32;
    loop {
        let guard = CallGuard::new(
            AbortController::follow(external.clone()),
            Deadline::after(options.policy.attempt_timeout),
        );
        let context = RetryContext {
            attempt,
            signal: guard.signal(),
        };

        let failure = match guard.run(action(context)).await {
            Ok(Ok(value)) => {
                if attempt > 0 {
                    tracing::debug!(attempt, "retried operation succeeded");
                }
                return Ok(value);
            }
            Ok(Err(failure)) => failure,
            Err(reason) => {
                tracing::debug!(attempt, ?reason, "attempt aborted");
                return Err(RetryError::Aborted(reason));
            }
        };

        if let Some(reason) = guard.reason() {
            return Err(RetryError::Aborted(reason));
        }

        attempt += 1;
        if attempt > options.policy.max_retries {
            tracing::warn!(attempts = attempt, "retry budget exhausted");
            return Err(RetryError::Operation(failure));
        }
        if !options.wants_retry(&failure) {
            tracing::debug!(attempt, "error is not retryable");
            return Err(RetryError::Operation(failure));
        }

        let delay = options.policy.calculate_delay(attempt);
        tracing::debug!(attempt, delay_ms = delay.as_millis(), "backing off before retry");
        match &external {
            Some(signal) => {
                tokio::select! {
                    biased;
                    () = signal.cancelled() => {
                        let reason = signal.reason().unwrap_or(AbortReason::Aborted);
                        return Err(RetryError::Aborted(reason));
                    }
                    () = tokio::time::sleep(delay) => {}
                }
            }
            None => tokio::time::sleep(delay).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_flatten() {
        let err: FetchError = RetryError::<FetchError>::Aborted(AbortReason::TimedOut).into();
        assert!(err.is_timeout());

        let err: FetchError = RetryError::Operation(error::network("refused")).into();
        assert!(err.is_network());
    }

    #[test]
    fn retry_error_display_and_source() {
        use std::error::Error as _;

        let aborted = RetryError::<FetchError>::Aborted(AbortReason::TimedOut);
        assert_eq!(aborted.to_string(), "retry aborted: operation timed out");
        assert!(aborted.source().is_some());

        let failed = RetryError::Operation(error::hook("nope"));
        assert_eq!(failed.to_string(), "request hook failed");
        assert_eq!(
            failed.source().map(ToString::to_string),
            Some("nope".to_string())
        );
    }

    #[test]
    fn default_options_retry_everything() {
        let options = RetryOptions::<&str>::new();
        assert!(options.wants_retry(&"anything"));
        assert_eq!(options.policy, RetryPolicy::default());
    }
}
