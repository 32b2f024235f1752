//! HTTP layer for the API
//!
//! [`HttpProvider`] is the request-primitive seam; [`SearchAdsHttpProvider`]
//! implements it with authentication, org context headers and retries over a
//! single-attempt [`searchads_transport::Transport`].

pub use provider::{Body, HttpProvider};
pub use searchads_provider::{SearchAdsHttpProvider, SearchAdsHttpProviderBuilder};

pub mod provider;
mod searchads_provider;

// Re-export HTTP types from the http crate for convenience
pub use ::http::{Method, StatusCode};
