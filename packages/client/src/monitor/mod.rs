//! Periodic connectivity checks
//!
//! A probe request is sent to an endpoint that answers `204 No Content`.
//! Any other outcome, including a timeout, counts as offline. The callback
//! only hears about transitions, never about repeated identical results.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use http::StatusCode;
use http::header::CACHE_CONTROL;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::FetchClient;
use crate::http::RequestConfig;

const UNKNOWN: u8 = 0;
const OFFLINE: u8 = 1;
const ONLINE: u8 = 2;

/// Settings for a [`NetworkMonitor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Probe endpoint; must answer 204 when reachable
    pub url: String,
    /// Time between checks
    pub interval: Duration,
    /// Time a single probe may take
    pub timeout: Duration,
    /// When false, `start` does nothing
    pub enabled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: "https://clients3.google.com/generate_204".to_string(),
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(3),
            enabled: true,
        }
    }
}

impl MonitorConfig {
    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem: a zero interval would
    /// spin without pause and a zero probe timeout would never expire.
    pub fn validate(&self) -> Result<(), String> {
        if self.interval.is_zero() {
            return Err("monitor interval cannot be zero".to_string());
        }
        if self.timeout.is_zero() {
            return Err("monitor probe timeout cannot be zero".to_string());
        }
        Ok(())
    }
}

/// Callback receiving the new online state
pub type StatusCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Background connectivity checker
///
/// Checks run on a tokio task between [`start`](Self::start) and
/// [`stop`](Self::stop). Dropping the monitor stops it.
pub struct NetworkMonitor {
    client: FetchClient,
    config: MonitorConfig,
    on_change: StatusCallback,
    last_status: Arc<AtomicU8>,
    task: Option<JoinHandle<()>>,
}

impl NetworkMonitor {
    pub fn new<F>(client: FetchClient, config: MonitorConfig, on_change: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        Self {
            client,
            config,
            on_change: Arc::new(on_change),
            last_status: Arc::new(AtomicU8::new(UNKNOWN)),
            task: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run a single probe without touching the reported state.
    ///
    /// An invalid configuration counts as offline and sends nothing.
    pub async fn check_once(&self) -> bool {
        if let Err(reason) = self.config.validate() {
            tracing::warn!(%reason, "network monitor probe skipped");
            return false;
        }
        probe(&self.client, &self.config).await
    }

    /// Start checking: one probe right away, then one per interval.
    ///
    /// Returns false without doing anything if the monitor is disabled,
    /// already running, invalid, or called outside a tokio runtime.
    pub fn start(&mut self) -> bool {
        if !self.config.enabled || self.is_running() {
            return false;
        }
        if let Err(reason) = self.config.validate() {
            tracing::warn!(%reason, "network monitor not started");
            return false;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("network monitor needs a tokio runtime to start");
            return false;
        };

        let client = self.client.clone();
        let config = self.config.clone();
        let on_change = Arc::clone(&self.on_change);
        let last_status = Arc::clone(&self.last_status);

        self.task = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let online = probe(&client, &config).await;
                let current = if online { ONLINE } else { OFFLINE };
                if last_status.swap(current, Ordering::AcqRel) != current {
                    tracing::info!(online, "network status changed");
                    on_change(online);
                }
            }
        }));
        tracing::debug!(url = %self.config.url, interval = ?self.config.interval, "network monitor started");
        true
    }

    /// Stop checking. The last observed status is kept.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("network monitor stopped");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Last reported status, or `None` before the first check completes.
    #[must_use]
    pub fn last_status(&self) -> Option<bool> {
        match self.last_status.load(Ordering::Acquire) {
            ONLINE => Some(true),
            OFFLINE => Some(false),
            _ => None,
        }
    }
}

impl Drop for NetworkMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for NetworkMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkMonitor")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("last_status", &self.last_status())
            .finish_non_exhaustive()
    }
}

async fn probe(client: &FetchClient, config: &MonitorConfig) -> bool {
    let request = RequestConfig::new()
        .header(CACHE_CONTROL, "no-cache")
        .timeout(config.timeout);
    match client.request(config.url.clone(), request).await {
        Ok(response) => response.status() == StatusCode::NO_CONTENT,
        Err(error) => {
            tracing::trace!(%error, "connectivity probe failed");
            false
        }
    }
}
