//! Cooperative cancellation primitives
//!
//! `AbortController` owns the right to abort; `AbortSignal` is the cheap,
//! cloneable handle threaded through requests, body reads and retry attempts.
//! A signal can follow any number of upstream signals, which is how the
//! caller's signal and an internal timeout are fanned into the single signal
//! handed to the transport.

mod guard;

use std::sync::{Arc, OnceLock};

use futures::future::{BoxFuture, FutureExt, select_all};
use tokio_util::sync::CancellationToken;

pub use guard::{CallGuard, Deadline};

/// Why an operation was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum AbortReason {
    /// Explicit abort through an `AbortController`
    #[error("operation aborted")]
    Aborted,
    /// A deadline elapsed before the operation settled
    #[error("operation timed out")]
    TimedOut,
}

#[derive(Debug)]
struct SignalInner {
    token: CancellationToken,
    reason: OnceLock<AbortReason>,
    upstream: Vec<AbortSignal>,
}

/// Read side of an `AbortController`
///
/// Once aborted a signal stays aborted. Cloning is cheap and every clone
/// observes the same state.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    inner: Arc<SignalInner>,
}

impl AbortSignal {
    /// Combine several signals into one that aborts as soon as any of them does.
    ///
    /// # Examples
    /// ```
    /// use fetchkit_client::abort::{AbortController, AbortSignal};
    ///
    /// let user = AbortController::new();
    /// let shutdown = AbortController::new();
    /// let merged = AbortSignal::any([user.signal(), shutdown.signal()]);
    ///
    /// shutdown.abort();
    /// assert!(merged.is_aborted());
    /// ```
    #[must_use]
    pub fn any(signals: impl IntoIterator<Item = AbortSignal>) -> AbortSignal {
        AbortController::follow(signals).signal()
    }

    /// Returns true once this signal or any signal it follows has been aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.inner.token.is_cancelled() || self.inner.upstream.iter().any(AbortSignal::is_aborted)
    }

    /// The abort reason, or `None` while the signal is still live.
    ///
    /// A reason recorded directly on this signal wins over reasons coming
    /// from upstream signals.
    #[must_use]
    pub fn reason(&self) -> Option<AbortReason> {
        if self.inner.token.is_cancelled() {
            return Some(self.inner.reason.get().copied().unwrap_or(AbortReason::Aborted));
        }
        self.inner.upstream.iter().find_map(AbortSignal::reason)
    }

    /// Resolves once the signal is aborted.
    ///
    /// The returned future owns its state, so it can be stored or raced
    /// without borrowing the signal.
    pub fn cancelled(&self) -> BoxFuture<'static, ()> {
        let token = self.inner.token.clone();
        if self.inner.upstream.is_empty() {
            return token.cancelled_owned().boxed();
        }

        let mut waiters: Vec<BoxFuture<'static, ()>> =
            Vec::with_capacity(self.inner.upstream.len() + 1);
        waiters.push(token.cancelled_owned().boxed());
        waiters.extend(self.inner.upstream.iter().map(AbortSignal::cancelled));

        async move {
            select_all(waiters).await;
        }
        .boxed()
    }
}

/// Write side of a cancellation token
#[derive(Debug, Clone)]
pub struct AbortController {
    signal: AbortSignal,
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortController {
    /// Create a controller whose signal only aborts through this controller.
    #[must_use]
    pub fn new() -> Self {
        Self::follow(Vec::new())
    }

    /// Create a controller whose signal also aborts when any `upstream` signal aborts.
    ///
    /// Upstream signals are observed lazily; no background task is spawned.
    #[must_use]
    pub fn follow(upstream: impl IntoIterator<Item = AbortSignal>) -> Self {
        Self {
            signal: AbortSignal {
                inner: Arc::new(SignalInner {
                    token: CancellationToken::new(),
                    reason: OnceLock::new(),
                    upstream: upstream.into_iter().collect(),
                }),
            },
        }
    }

    /// A handle observing this controller.
    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Abort with `AbortReason::Aborted`.
    pub fn abort(&self) {
        self.abort_with(AbortReason::Aborted);
    }

    /// Abort with an explicit reason.
    ///
    /// The first abort wins: aborting an already aborted signal (directly or
    /// through an upstream) keeps the original reason.
    pub fn abort_with(&self, reason: AbortReason) {
        if self.signal.is_aborted() {
            return;
        }
        if self.signal.inner.reason.set(reason).is_ok() {
            self.signal.inner.token.cancel();
        }
    }

    /// Returns true once the controlled signal is aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.signal.is_aborted()
    }
}
