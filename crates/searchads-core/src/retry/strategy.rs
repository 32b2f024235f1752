//! The retry schedule abstraction.

use std::error::Error;
use std::time::Duration;

/// A schedule for retrying failed operations.
///
/// Implementations decide how long to wait between attempts and when to give
/// up. They do not run the operation themselves: callers own the attempt loop
/// because request-level concerns (auth refresh, server hints, cancellation)
/// live above this crate.
///
/// # Examples
///
/// ```rust
/// use searchads_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::default();
/// let mut waits = Vec::new();
/// for attempt in 0..backoff.max_retries() {
///     waits.push(backoff.next_delay(attempt).unwrap_or(Duration::ZERO));
/// }
/// assert_eq!(waits.len(), 4);
/// ```
pub trait BackoffStrategy: Send + Sync {
    /// Determine if an error is retryable.
    ///
    /// Default implementation returns `true` for all errors while attempts
    /// remain.
    ///
    /// # Parameters
    /// - `error`: The error to evaluate
    /// - `attempt`: The number of attempts already made minus one (0-indexed)
    fn should_retry(&self, error: &dyn Error, attempt: u32) -> bool {
        let _ = error;
        attempt < self.max_retries()
    }

    /// Calculate the delay before the next attempt.
    ///
    /// `attempt` is the 0-based index of the attempt that just failed, so
    /// `next_delay(0)` is the wait between the first and second tries.
    ///
    /// Returns `None` when the strategy has no delay to offer.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;

    /// Get the maximum number of retry attempts.
    ///
    /// If `max_retries() == 4`, the operation is attempted up to 5 times
    /// total (1 initial + 4 retries).
    fn max_retries(&self) -> u32;

    /// Total number of attempts this strategy allows.
    fn max_attempts(&self) -> u32 {
        self.max_retries().saturating_add(1)
    }
}
