//! OAuth2 access tokens from a signed client assertion
//!
//! The API does not accept a static secret. Instead the client signs a
//! short JWT (ES256) with its private key and exchanges it at the token
//! endpoint for a bearer token, which is cached until shortly before it
//! expires.

use crate::config::Credentials;
use crate::error::{Error, Result};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use p256::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use searchads_protocol::{OAuthErrorResponse, TokenRequest, TokenResponse};
use searchads_transport::{HttpRequest, Transport};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Audience of every client assertion.
pub const ASSERTION_AUDIENCE: &str = "https://appleid.apple.com";

/// Scope requested in the token exchange.
pub const TOKEN_SCOPE: &str = "searchadsorg";

/// Lifetime of a client assertion.
pub const ASSERTION_LIFETIME: Duration = Duration::from_secs(180 * 24 * 60 * 60);

/// A cached token is refreshed once it is this close to expiry.
pub const REFRESH_BUFFER: Duration = Duration::from_secs(60);

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Source of bearer tokens for outgoing requests.
#[async_trait]
pub trait TokenSource: Send + Sync + fmt::Debug {
    /// A token valid for at least [`REFRESH_BUFFER`], refreshing if needed.
    async fn token(&self) -> Result<String>;

    /// Drop the cached token so the next [`TokenSource::token`] refreshes.
    async fn invalidate(&self);
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_BUFFER < self.expires_at
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Token manager for the client-credentials exchange.
///
/// The cache sits behind an async mutex that is held across the exchange,
/// so concurrent callers on a cold cache wait for one refresh instead of
/// each starting their own.
pub struct TokenManager {
    transport: Arc<dyn Transport>,
    token_url: String,
    client_id: String,
    team_id: String,
    key_id: String,
    signing_key: EncodingKey,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    /// Build a token manager, reading the key from `private_key_path`.
    pub fn from_credentials(credentials: &Credentials, transport: Arc<dyn Transport>) -> Result<Self> {
        let pem = std::fs::read_to_string(&credentials.private_key_path).map_err(|e| {
            Error::KeyLoad(format!(
                "read private key {}: {}",
                credentials.private_key_path, e
            ))
        })?;
        Self::from_pem(&SecretString::new(pem.into_boxed_str()), credentials, transport)
    }

    /// Build a token manager from PEM key material.
    ///
    /// Accepts PKCS#8 (`PRIVATE KEY`) and SEC1 (`EC PRIVATE KEY`) encodings
    /// of a P-256 key.
    pub fn from_pem(
        pem: &SecretString,
        credentials: &Credentials,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let signing_key = load_signing_key(pem.expose_secret())?;

        Ok(Self {
            transport,
            token_url: crate::DEFAULT_TOKEN_URL.to_string(),
            client_id: credentials.client_id.clone(),
            team_id: credentials.team_id.clone(),
            key_id: credentials.key_id.clone(),
            signing_key,
            cache: Mutex::new(None),
        })
    }

    /// Use a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// The token endpoint in use.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    fn build_assertion(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let lifetime = i64::try_from(ASSERTION_LIFETIME.as_secs()).unwrap_or(i64::MAX);
        let claims = AssertionClaims {
            iss: &self.team_id,
            sub: &self.client_id,
            aud: ASSERTION_AUDIENCE,
            iat: now,
            exp: now.saturating_add(lifetime),
        };

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());

        jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .map_err(|e| Error::Authentication(format!("build JWT: {}", e)))
    }

    async fn refresh(&self, cache: &mut Option<CachedToken>) -> Result<String> {
        debug!(token_url = %self.token_url, "Refreshing access token");

        let assertion = self.build_assertion()?;
        let form = serde_urlencoded::to_string(TokenRequest {
            grant_type: "client_credentials",
            client_id: &self.client_id,
            client_secret: &assertion,
            scope: TOKEN_SCOPE,
        })
        .map_err(|e| Error::Authentication(format!("encode token request: {}", e)))?;

        let request = HttpRequest::new(http::Method::POST, self.token_url.as_str())
            .with_header("Content-Type", FORM_CONTENT_TYPE)
            .with_header("Accept", "application/json")
            .with_body(form);

        let response = self
            .transport
            .send_http(request)
            .await
            .map_err(|e| Error::Authentication(format!("token request: {}", e)))?;

        if response.status != 200 {
            return Err(Error::Authentication(exchange_failure(
                response.status,
                &response.body,
            )));
        }

        let parsed: TokenResponse = serde_json::from_slice(&response.body)
            .map_err(|e| Error::Authentication(format!("parse token response: {}", e)))?;
        if parsed.access_token.is_empty() {
            return Err(Error::Authentication(
                "no access_token in response".to_string(),
            ));
        }

        let lifetime = Duration::from_secs(u64::try_from(parsed.expires_in).unwrap_or(0));
        debug!(expires_in = parsed.expires_in, "Access token refreshed");

        let now = Instant::now();
        *cache = Some(CachedToken {
            value: parsed.access_token.clone(),
            expires_at: now.checked_add(lifetime).unwrap_or(now),
        });
        Ok(parsed.access_token)
    }
}

#[async_trait]
impl TokenSource for TokenManager {
    async fn token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref()
            && cached.is_fresh(Instant::now())
        {
            return Ok(cached.value.clone());
        }
        self.refresh(&mut cache).await
    }

    async fn invalidate(&self) {
        debug!("Invalidating cached access token");
        *self.cache.lock().await = None;
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("team_id", &self.team_id)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

fn exchange_failure(status: u16, body: &[u8]) -> String {
    match serde_json::from_slice::<OAuthErrorResponse>(body) {
        Ok(oauth) if !oauth.error.is_empty() => match oauth.error_description.as_deref() {
            Some(description) if !description.is_empty() => format!(
                "token exchange failed ({}): {}: {}",
                status, oauth.error, description
            ),
            _ => format!("token exchange failed ({}): {}", status, oauth.error),
        },
        _ => format!(
            "token exchange failed ({}): {}",
            status,
            String::from_utf8_lossy(body)
        ),
    }
}

// jsonwebtoken only takes PKCS#8 for EC keys, so SEC1 input is re-encoded.
fn load_signing_key(pem: &str) -> Result<EncodingKey> {
    let secret = p256::SecretKey::from_pkcs8_pem(pem).or_else(|pkcs8_err| {
        p256::SecretKey::from_sec1_pem(pem).map_err(|sec1_err| {
            Error::KeyLoad(format!(
                "parse private key: {} (also tried SEC1: {})",
                pkcs8_err, sec1_err
            ))
        })
    })?;

    let der = secret
        .to_pkcs8_der()
        .map_err(|e| Error::KeyLoad(format!("encode private key: {}", e)))?;
    Ok(EncodingKey::from_ec_der(der.as_bytes()))
}
