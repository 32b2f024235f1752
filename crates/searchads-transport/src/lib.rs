//! HTTP transport layer for the searchads client
//!
//! Provides the single-attempt HTTP seam that the API client drives, and the
//! retry policy that decides whether and when a failed attempt is repeated.
//!
//! # Architecture
//!
//! - **Transport trait**: one request in, one response out, no retries
//! - **HTTP transport**: `reqwest`-backed implementation with a per-attempt timeout
//! - **Retry policy**: safe-to-retry classification, `Retry-After` parsing, capped backoff
//! - **Error handling**: [`TransportError`] for network-level failures
//!
//! # Usage
//!
//! ```ignore
//! use searchads_transport::{HttpRequest, HttpTransport, Transport};
//!
//! let transport = HttpTransport::new()?;
//! let request = HttpRequest::new(http::Method::GET, "https://api.example.com/api/v5/acls");
//! let response = transport.send_http(request).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use crate::http::{HttpTransport, HttpTransportConfig, RetryPolicy};
pub use traits::{HttpRequest, HttpResponse, Transport};
