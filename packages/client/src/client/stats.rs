//! Client statistics

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::{FetchError, Kind};

/// Counters shared by every clone of a `FetchClient`
///
/// Each call is counted once when it starts and once when it settles.
#[derive(Debug)]
pub struct ClientStats {
    /// Calls started
    pub requests_total: AtomicU64,
    /// Calls settled with a 2xx response
    pub requests_successful: AtomicU64,
    /// Calls settled with a non-2xx response
    pub requests_http_failed: AtomicU64,
    /// Calls settled by the transport failing
    pub requests_network_failed: AtomicU64,
    /// Calls cancelled by a signal or a timeout
    pub requests_aborted: AtomicU64,
    /// Calls that failed in a hook or while building the request
    pub requests_errored: AtomicU64,
    /// Request body bytes handed to the transport, where the length was known
    pub bytes_sent: AtomicU64,
    /// Client creation time
    pub created_at: Instant,
}

impl Default for ClientStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            requests_successful: AtomicU64::new(0),
            requests_http_failed: AtomicU64::new(0),
            requests_network_failed: AtomicU64::new(0),
            requests_aborted: AtomicU64::new(0),
            requests_errored: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            created_at: Instant::now(),
        }
    }

    pub(crate) fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_bytes_sent(&self, bytes: u64) {
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self) {
        self.requests_successful.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a settled failure under its kind.
    pub(crate) fn record_failure(&self, error: &FetchError) {
        let counter = match error.kind() {
            Kind::HttpStatus(_) => &self.requests_http_failed,
            Kind::Network => &self.requests_network_failed,
            Kind::Abort(_) => &self.requests_aborted,
            Kind::Serialization | Kind::Builder | Kind::Hook | Kind::Body => &self.requests_errored,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get client uptime
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Consistent-enough copy of the counters for reporting
    #[must_use]
    pub fn snapshot(&self) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_successful: self.requests_successful.load(Ordering::Relaxed),
            requests_http_failed: self.requests_http_failed.load(Ordering::Relaxed),
            requests_network_failed: self.requests_network_failed.load(Ordering::Relaxed),
            requests_aborted: self.requests_aborted.load(Ordering::Relaxed),
            requests_errored: self.requests_errored.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            uptime: self.uptime(),
        }
    }
}

/// Point-in-time copy of [`ClientStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientStatsSnapshot {
    pub requests_total: u64,
    pub requests_successful: u64,
    pub requests_http_failed: u64,
    pub requests_network_failed: u64,
    pub requests_aborted: u64,
    pub requests_errored: u64,
    pub bytes_sent: u64,
    pub uptime: Duration,
}

impl ClientStatsSnapshot {
    /// Calls that have settled, successfully or not
    #[must_use]
    pub fn settled(&self) -> u64 {
        self.requests_successful
            + self.requests_http_failed
            + self.requests_network_failed
            + self.requests_aborted
            + self.requests_errored
    }

    /// Share of settled calls that succeeded; 1.0 before any call settles.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        let settled = self.settled();
        if settled == 0 {
            1.0
        } else {
            self.requests_successful as f64 / settled as f64
        }
    }
}
