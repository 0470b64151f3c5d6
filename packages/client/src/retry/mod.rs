//! Retry logic with exponential backoff and jitter
//!
//! [`retry`] wraps any async operation; [`RetryPolicy`] holds the delay math
//! and can be shared through `ClientConfig`.

pub mod executor;
pub mod policy;

pub use executor::{RetryContext, RetryError, RetryOptions, ShouldRetry, retry};
pub use policy::RetryPolicy;
