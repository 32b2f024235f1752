#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core abstractions for the searchads workspace.
//!
//! This crate is HTTP-agnostic. It provides the backoff schedule that the
//! transport layer plugs its retry classification into:
//!
//! - [`retry::BackoffStrategy`] - how long to wait and how often to try
//! - [`retry::ExponentialBackoff`] - doubling delays with a hard cap
//!
//! # Examples
//!
//! ```rust
//! use searchads_core::prelude::*;
//! use std::time::Duration;
//!
//! let backoff = ExponentialBackoff::builder()
//!     .max_retries(4)
//!     .initial_delay(Duration::from_secs(2))
//!     .max_delay(Duration::from_secs(16))
//!     .build();
//!
//! assert_eq!(backoff.next_delay(0), Some(Duration::from_secs(2)));
//! assert_eq!(backoff.next_delay(5), Some(Duration::from_secs(16)));
//! ```

pub mod retry;

/// Convenient re-exports of commonly used items.
pub mod prelude {
    pub use crate::retry::{BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder};
}
