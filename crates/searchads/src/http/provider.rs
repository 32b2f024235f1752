//! HTTP provider trait for the API request primitives
//!
//! Resource code talks to the API only through [`HttpProvider`], so tests
//! can substitute an in-memory double for the real retrying client.

use crate::error::Result;
use ::http::Method;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// Request body accepted by the provider; serialized to JSON once.
pub type Body<'a> = &'a (dyn erased_serde::Serialize + Send + Sync);

/// Provider trait for issuing API requests.
///
/// Every call is one logical operation: implementations apply headers,
/// authentication and retries, and return the raw 2xx response body for the
/// caller to decode.
#[async_trait]
pub trait HttpProvider: Send + Sync + fmt::Debug {
    /// Run one logical operation.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - Path below the API root, e.g. `/campaigns/find`
    /// * `body` - Optional request body, serialized to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The API answers with a non-2xx status that is not retried
    /// - Every allowed attempt fails
    /// - A token cannot be obtained
    async fn request(&self, method: Method, path: &str, body: Option<Body<'_>>) -> Result<Bytes>;

    /// `GET path`
    async fn get(&self, path: &str) -> Result<Bytes> {
        self.request(Method::GET, path, None).await
    }

    /// `POST path` with a JSON body
    async fn post(&self, path: &str, body: Body<'_>) -> Result<Bytes> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// `PUT path` with a JSON body
    async fn put(&self, path: &str, body: Body<'_>) -> Result<Bytes> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// `DELETE path`
    async fn delete(&self, path: &str) -> Result<Bytes> {
        self.request(Method::DELETE, path, None).await
    }

    /// Bulk delete: the API models it as a `POST` with a body.
    async fn delete_with_body(&self, path: &str, body: Body<'_>) -> Result<Bytes> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Get the base URL for this provider (for debugging).
    fn base_url(&self) -> &str;
}

/// Serialize a body to JSON bytes.
pub(crate) fn serialize_body(body: Body<'_>) -> Result<Bytes> {
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(crate::error::Error::Serialization)
}
