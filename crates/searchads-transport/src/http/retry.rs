//! Retry policy for HTTP transport
//!
//! Wraps the capped exponential schedule from `searchads-core` with the
//! request-level rules the API client applies: which requests are safe to
//! repeat, how long to wait after a rate limit or server error, and how to
//! read a `Retry-After` header.

use crate::error::TransportError;
use ::http::Method;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::Duration;
pub use searchads_core::retry::{BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder};

/// HTTP-specific retry policy.
///
/// # Default Configuration
///
/// - `max_retries`: 4 (five attempts in total)
/// - `initial_delay`: 2s
/// - `max_delay`: 16s
/// - `multiplier`: 2.0
/// - `jitter`: none
///
/// # Examples
///
/// ```rust
/// use searchads_transport::http::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.backoff(0), Duration::from_secs(2));
/// assert_eq!(policy.backoff(3), Duration::from_secs(16));
///
/// let fast = RetryPolicy::builder()
///     .initial_delay(Duration::from_millis(1))
///     .max_delay(Duration::from_millis(8))
///     .build();
/// assert_eq!(fast.backoff(10), Duration::from_millis(8));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    inner: ExponentialBackoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            inner: ExponentialBackoff::default(),
        }
    }
}

impl RetryPolicy {
    /// Create a new builder for configuring HTTP retry policy.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            inner: ExponentialBackoff::builder(),
        }
    }

    /// Whether repeating this request cannot cause duplicate side effects.
    ///
    /// GET, PUT and DELETE are idempotent. POST is only safe for read-shaped
    /// endpoints: paths ending in `/find`, paths starting with `/reports/`,
    /// and paths containing `/delete/bulk`. Any query string is ignored.
    pub fn is_safe_to_retry(method: &Method, path: &str) -> bool {
        let path = path.split_once('?').map_or(path, |(p, _)| p);

        if *method == Method::GET || *method == Method::PUT || *method == Method::DELETE {
            return true;
        }

        if *method == Method::POST {
            return path.ends_with("/find")
                || path.starts_with("/reports/")
                || path.contains("/delete/bulk");
        }

        false
    }

    /// Check if a transport error is worth another attempt.
    ///
    /// Network failures (timeouts, refused or reset connections, truncated
    /// bodies) are retryable; everything else will fail the same way again.
    pub fn is_retryable(error: &TransportError) -> bool {
        error.is_network()
    }

    /// Get the underlying ExponentialBackoff instance.
    pub fn inner(&self) -> &ExponentialBackoff {
        &self.inner
    }

    /// The capped backoff after the given 0-based attempt failed.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.inner.next_delay(attempt).unwrap_or(Duration::ZERO)
    }

    /// Wait before retrying a 429: the server hint when present, otherwise backoff.
    pub fn rate_limit_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.backoff(attempt))
    }

    /// Wait before retrying a 5xx: the larger of backoff and the server hint.
    pub fn server_error_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.backoff(attempt);
        match retry_after {
            Some(hint) if hint > backoff => hint,
            _ => backoff,
        }
    }
}

impl BackoffStrategy for RetryPolicy {
    fn should_retry(&self, error: &dyn std::error::Error, attempt: u32) -> bool {
        self.inner.should_retry(error, attempt)
    }

    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        self.inner.next_delay(attempt)
    }

    fn max_retries(&self) -> u32 {
        self.inner.max_retries()
    }
}

/// Builder for HTTP retry policies.
#[derive(Debug)]
pub struct RetryPolicyBuilder {
    inner: ExponentialBackoffBuilder,
}

impl RetryPolicyBuilder {
    /// Set the maximum number of retry attempts.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.inner = self.inner.max_retries(max_retries);
        self
    }

    /// Set the initial delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.inner = self.inner.initial_delay(delay);
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.inner = self.inner.max_delay(delay);
        self
    }

    /// Set the exponential multiplier.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.inner = self.inner.multiplier(multiplier);
        self
    }

    /// Set the jitter factor (0.0 to 1.0).
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.inner = self.inner.jitter(jitter);
        self
    }

    /// Build the retry policy.
    pub fn build(self) -> RetryPolicy {
        RetryPolicy {
            inner: self.inner.build(),
        }
    }
}

/// Parse a `Retry-After` header value relative to the current time.
///
/// Accepts delta-seconds or an HTTP date. Returns `None` for values that are
/// unparseable, non-positive, or already in the past.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    parse_retry_after_at(value, Utc::now())
}

/// Parse a `Retry-After` header value relative to `now`.
pub fn parse_retry_after_at(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(seconds) = value.parse::<i64>() {
        return u64::try_from(seconds)
            .ok()
            .filter(|s| *s > 0)
            .map(Duration::from_secs);
    }

    let at = parse_http_date(value)?;
    (at - now).to_std().ok().filter(|d| !d.is_zero())
}

// IMF-fixdate, RFC 850 and asctime, in that order.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const FORMATS: [&str; 2] = ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}
