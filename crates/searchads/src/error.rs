//! Error types for the searchads client
//!
//! API failures keep everything the server told us (status, structured
//! entries, raw body, `Retry-After`) so the caller can tell an explainable
//! API error apart from an internal or network failure.

use searchads_protocol::{ErrorDetail, ErrorEnvelope};
use searchads_transport::TransportError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail with a searchads error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the searchads client.
#[derive(Debug, Error)]
pub enum Error {
    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The OAuth2 token exchange failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The private signing key could not be read or parsed.
    #[error("load private key: {0}")]
    KeyLoad(String),

    /// A single HTTP attempt failed below the HTTP status level.
    #[error("http request: {0}")]
    Transport(#[from] TransportError),

    /// Every allowed attempt failed; `source` is the last failure.
    #[error("max retries exceeded: {source}")]
    MaxRetriesExceeded {
        /// Attempts made, including the first
        attempts: u32,
        /// The failure of the final attempt
        #[source]
        source: Box<Error>,
    },

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// A pagination request resolved to a page size that is not positive.
    #[error("invalid page size: {0}")]
    InvalidPageSize(i64),

    /// Request body serialization failed.
    #[error("marshal request body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The response body did not match the expected envelope.
    #[error("parse response: {0}")]
    ResponseParse(String),

    /// Missing or invalid configuration.
    #[error("invalid config: {0}")]
    Config(String),

    /// Invalid URL provided.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Whether this is an API error worth showing to a user as-is.
    ///
    /// Looks through a [`Error::MaxRetriesExceeded`] wrapper.
    pub fn is_api_error(&self) -> bool {
        self.api_error().is_some()
    }

    /// The underlying API error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            Error::MaxRetriesExceeded { source, .. } => source.api_error(),
            _ => None,
        }
    }

    /// HTTP status of the underlying API error.
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|api| api.status)
    }

    /// Server-provided `Retry-After` of the underlying API error.
    pub fn retry_after(&self) -> Option<Duration> {
        self.api_error().and_then(|api| api.retry_after)
    }
}

/// A non-2xx API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Structured entries parsed from the error envelope
    pub errors: Vec<ErrorDetail>,
    /// Response body as text
    pub raw_body: String,
    /// Parsed `Retry-After` for 429 and 5xx responses
    pub retry_after: Option<Duration>,
}

impl ApiError {
    /// Build an API error from a response status and body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            errors: ErrorEnvelope::parse_entries(body),
            raw_body: String::from_utf8_lossy(body).into_owned(),
            retry_after: None,
        }
    }

    /// Attach a server retry hint.
    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Human-readable messages joined with `"; "`.
    ///
    /// Falls back to the raw body when no structured entries were parsed.
    pub fn message(&self) -> String {
        if self.errors.is_empty() {
            return self.raw_body.clone();
        }
        self.errors
            .iter()
            .map(ErrorDetail::describe)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {}", self.status)?;
        if let Some(retry_after) = self.retry_after {
            write!(f, " (retry after {:?})", retry_after)?;
        }
        write!(f, ": {}", self.message())
    }
}

impl std::error::Error for ApiError {}
