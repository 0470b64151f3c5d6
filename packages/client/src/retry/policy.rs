//! Retry policy configuration with exponential backoff and jitter
//!
//! Delays double with every failed attempt, are capped at `max_delay`, and
//! are then optionally scaled by a random factor to spread out retries from
//! many clients failing at once.

use std::time::Duration;

/// Retry policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay, applied before jitter
    pub max_delay: Duration,
    /// Scale each delay by a uniform factor in `[0.5, 1.5)`
    pub jitter: bool,
    /// Abort any single attempt that runs longer than this
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    /// Two retries, 300ms base delay doubling up to 5s, with jitter and no
    /// per-attempt timeout.
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(300),
            max_delay: Duration::from_millis(5000),
            jitter: true,
            attempt_timeout: None,
        }
    }
}

impl RetryPolicy {
    /// Create aggressive retry policy for critical operations
    ///
    /// Retries more often with shorter waits, for operations that must
    /// succeed and can tolerate the extra load.
    #[inline]
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            jitter: true,
            attempt_timeout: Some(Duration::from_secs(15)),
        }
    }

    /// Create conservative retry policy for non-critical operations
    #[inline]
    #[must_use]
    pub fn conservative() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            jitter: true,
            attempt_timeout: Some(Duration::from_secs(60)),
        }
    }

    /// Create no-retry policy (single attempt only)
    #[inline]
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
            attempt_timeout: None,
        }
    }

    /// Delay before retry number `attempt` (1-based) without jitter.
    ///
    /// `min(base_delay * 2^(attempt - 1), max_delay)`. Attempt 0 has no
    /// delay; overflow saturates at `max_delay`.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use fetchkit_client::retry::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.base_delay_for(1), Duration::from_millis(300));
    /// assert_eq!(policy.base_delay_for(3), Duration::from_millis(1200));
    /// assert_eq!(policy.base_delay_for(10), Duration::from_millis(5000));
    /// ```
    #[must_use]
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Calculate the delay before retry number `attempt`, including jitter.
    #[inline]
    #[must_use]
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay = self.base_delay_for(attempt);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let factor = 0.5 + fastrand::f64();
        Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
    }

    /// Validate policy configuration for consistency
    ///
    /// # Errors
    ///
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_delay > self.max_delay {
            return Err("base_delay cannot exceed max_delay".to_string());
        }

        if self.attempt_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err("attempt_timeout must be positive when set".to_string());
        }

        Ok(())
    }
}
