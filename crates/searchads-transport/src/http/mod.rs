//! HTTP transport implementation
//!
//! Provides a reqwest-based transport and the retry policy used by callers
//! that drive attempts over it.

pub mod client;
pub mod retry;

pub use client::{HttpTransport, HttpTransportConfig};
pub use retry::{RetryPolicy, RetryPolicyBuilder, parse_retry_after};
