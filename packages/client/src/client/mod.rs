//! HTTP client modules with focused separation of concerns
//!
//! `core` holds the client handle, `execute` the per-call orchestration,
//! `pending` the lazy request object and `stats` the shared counters.

pub mod core;
mod execute;
pub mod pending;
pub mod stats;

pub use self::core::FetchClient;

pub use pending::PendingRequest;
pub use stats::{ClientStats, ClientStatsSnapshot};
