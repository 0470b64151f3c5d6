//! Racing a future against a signal and an optional deadline
//!
//! Every timer created here is a future owned by the race itself, so it is
//! dropped on whichever branch wins. Nothing outlives a `run` call.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

use super::{AbortController, AbortReason, AbortSignal};

/// Point in time after which a guarded operation is aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// A deadline that never expires
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self(None)
    }

    /// A deadline `timeout` from now; `None` or a zero duration means no deadline.
    #[inline]
    #[must_use]
    pub fn after(timeout: Option<Duration>) -> Self {
        Self(
            timeout
                .filter(|timeout| !timeout.is_zero())
                .map(|timeout| Instant::now() + timeout),
        )
    }

    /// The instant this deadline expires at, if any.
    #[inline]
    #[must_use]
    pub fn instant(&self) -> Option<Instant> {
        self.0
    }

    async fn expired(self) {
        match self.0 {
            Some(at) => sleep_until(at).await,
            None => std::future::pending().await,
        }
    }
}

/// Cancellation scope of one call: a controller plus a deadline
///
/// The controller's signal is what the guarded work observes. When the
/// deadline fires the controller is aborted with `AbortReason::TimedOut`
/// before the race returns, so downstream holders of the signal see it.
#[derive(Debug, Clone)]
pub struct CallGuard {
    controller: AbortController,
    deadline: Deadline,
}

impl CallGuard {
    #[must_use]
    pub fn new(controller: AbortController, deadline: Deadline) -> Self {
        Self { controller, deadline }
    }

    /// The signal guarded work should observe.
    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        self.controller.signal()
    }

    #[must_use]
    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// The abort reason once the scope has been aborted.
    #[must_use]
    pub fn reason(&self) -> Option<AbortReason> {
        self.controller.signal().reason()
    }

    /// Drive `future` until it completes, the signal aborts, or the deadline passes.
    ///
    /// An already aborted scope returns immediately without polling `future`.
    ///
    /// # Errors
    ///
    /// Returns the `AbortReason` when the signal or the deadline wins the race.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, AbortReason>
    where
        F: Future,
    {
        let signal = self.controller.signal();
        if let Some(reason) = signal.reason() {
            return Err(reason);
        }

        tokio::select! {
            biased;
            () = signal.cancelled() => Err(signal.reason().unwrap_or(AbortReason::Aborted)),
            () = self.deadline.expired() => {
                self.controller.abort_with(AbortReason::TimedOut);
                Err(signal.reason().unwrap_or(AbortReason::TimedOut))
            }
            output = future => Ok(output),
        }
    }
}
