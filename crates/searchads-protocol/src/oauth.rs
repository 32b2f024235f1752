//! OAuth2 client-credentials exchange bodies

use serde::{Deserialize, Serialize};

/// Form body for the token endpoint (`application/x-www-form-urlencoded`).
///
/// `client_secret` carries the signed client assertion, not a static secret.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest<'a> {
    /// Always `client_credentials`
    pub grant_type: &'a str,
    /// OAuth2 client identifier
    pub client_id: &'a str,
    /// Signed client assertion
    pub client_secret: &'a str,
    /// Requested scope
    pub scope: &'a str,
}

/// Successful token endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    /// Bearer token; empty when the server omitted it
    #[serde(default)]
    pub access_token: String,
    /// Token type, normally `Bearer`
    #[serde(default)]
    pub token_type: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: i64,
}

/// OAuth2-style error body, e.g. `{"error":"invalid_client","error_description":"..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthErrorResponse {
    /// Error code
    #[serde(default)]
    pub error: String,
    /// Optional human-readable description
    #[serde(default)]
    pub error_description: Option<String>,
}
