//! # searchads
//!
//! Async client core for the Apple Search Ads campaign management API:
//! - OAuth2 client-credentials tokens from an ES256-signed client assertion,
//!   cached and refreshed shortly before expiry
//! - Request primitives (`GET`, `POST`, `PUT`, `DELETE`, bulk delete) with
//!   org context headers and idempotency-aware retries
//! - Auto-pagination for offset/limit listings and `/find` selectors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use searchads::{Client, Selector};
//! use searchads::protocol::{Condition, Pagination};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads ~/.aads/config.yaml, overridden by AADS_* variables.
//!     let client = Client::from_env()?;
//!
//!     let selector = Selector::new()
//!         .with_condition(Condition::new("status", "EQUALS", ["ENABLED"]))
//!         .with_pagination(Pagination::new(0, 100));
//!
//!     let campaigns: Vec<serde_json::Value> =
//!         client.find_all("/campaigns/find", &selector, 0).await?;
//!     println!("{} campaigns", campaigns.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use auth::{TokenManager, TokenSource};
pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, Credentials};
pub use error::{ApiError, Error, Result};
pub use crate::http::{HttpProvider, SearchAdsHttpProvider};
pub use pagination::{DEFAULT_PAGE_SIZE, collect_all_offset_paginated, collect_all_selector_paginated};
pub use searchads_protocol::{PageDetail, Selector};
pub use searchads_transport::RetryPolicy;

// Module declarations
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod pagination;

#[cfg(test)]
mod property_tests;

/// Wire types, re-exported from `searchads-protocol`.
pub mod protocol {
    pub use searchads_protocol::*;
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.searchads.apple.com/api/v5";

/// Default OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://appleid.apple.com/auth/oauth2/token";

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ApiError, Client, ClientConfig, Credentials, Error, HttpProvider, PageDetail, Result,
        RetryPolicy, Selector,
    };
    pub use searchads_protocol::{Condition, Pagination, SortOrder, Sorting};
}

// Re-export key dependencies for convenience
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
