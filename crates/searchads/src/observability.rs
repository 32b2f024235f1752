//! Centralized observability utilities for structured logging
//!
//! Every logical API operation is logged through this layer: one debug line
//! per attempt, a warning for each scheduled retry, and a final success or
//! failure line. Tokens and keys are never passed in here.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path relative to the API root
    pub path: String,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body_size: None,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log an attempt being sent
    pub fn log_attempt(&self, attempt: u32, max_attempts: u32) {
        debug!(
            method = %self.method,
            path = %self.path,
            body_size = self.body_size,
            attempt = attempt + 1,
            max_attempts,
            "Sending HTTP request"
        );
    }

    /// Log a retry being scheduled after a failed attempt
    pub fn log_retry(&self, attempt: u32, wait: Duration, reason: &str) {
        warn!(
            method = %self.method,
            path = %self.path,
            attempt = attempt + 1,
            wait_ms = wait.as_millis(),
            reason = %reason,
            "Retrying HTTP request"
        );
    }

    /// Log the one-time token refresh after a 401
    pub fn log_auth_refresh(&self) {
        debug!(
            method = %self.method,
            path = %self.path,
            "401 Unauthorized; refreshing token and retrying once"
        );
    }
}

/// HTTP response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code, 0 when no response was received
    pub status: u16,
    /// Response body size in bytes (optional)
    pub body_size: Option<usize>,
    /// Time elapsed for the whole operation
    pub elapsed: Duration,
    /// Number of retries taken (if any)
    pub retries: u32,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: u16, elapsed: Duration) -> Self {
        Self {
            status,
            body_size: None,
            elapsed,
            retries: 0,
        }
    }

    /// Set the response body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Set the number of retries
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Log successful response
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            body_size = self.body_size,
            retries = self.retries,
            "HTTP request succeeded"
        );
    }

    /// Log failed response
    pub fn log_error(&self, request: &RequestMetadata, error: &str) {
        warn!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            error = %error,
            retries = self.retries,
            "HTTP request failed"
        );
    }
}

/// Timer for measuring request duration
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Log pagination progress
pub fn log_page(offset: i64, limit: i64, returned: usize, total: Option<i64>) {
    debug!(offset, limit, returned, total, "Fetched page");
}

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects `searchads=debug`
/// and the default is `searchads=warn`. Calling this twice is a no-op.
#[cfg(feature = "trace")]
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let fallback = if verbose {
        "searchads=debug"
    } else {
        "searchads=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_metadata_creation() {
        let metadata = RequestMetadata::new("POST", "/campaigns/find");
        assert_eq!(metadata.method, "POST");
        assert_eq!(metadata.path, "/campaigns/find");
        assert_eq!(metadata.body_size, None);
    }

    #[test]
    fn test_request_metadata_with_body_size() {
        let metadata = RequestMetadata::new("POST", "/campaigns/find").with_body_size(1024);
        assert_eq!(metadata.body_size, Some(1024));
    }

    #[test]
    fn test_response_metadata_with_retries() {
        let elapsed = Duration::from_millis(500);
        let metadata = ResponseMetadata::new(200, elapsed)
            .with_retries(2)
            .with_body_size(10);
        assert_eq!(metadata.status, 200);
        assert_eq!(metadata.elapsed, elapsed);
        assert_eq!(metadata.retries, 2);
        assert_eq!(metadata.body_size, Some(10));
    }

    #[test]
    fn test_request_timer() {
        let timer = RequestTimer::start();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed().as_millis() >= 10);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(true);
        init_tracing(false);
    }
}
