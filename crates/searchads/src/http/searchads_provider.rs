//! HTTP provider for the campaign management API
//!
//! Drives each logical operation through up to `max_retries + 1` attempts:
//! attaches the bearer token and org context, classifies failures, waits
//! out backoff or server hints, and refreshes the token once after a 401.

use super::provider::{Body, HttpProvider, serialize_body};
use crate::auth::TokenSource;
use crate::error::{ApiError, Error, Result};
use crate::observability::{RequestMetadata, RequestTimer, ResponseMetadata};
use ::http::Method;
use async_trait::async_trait;
use bytes::Bytes;
use searchads_core::retry::BackoffStrategy;
use searchads_transport::http::parse_retry_after;
use searchads_transport::{HttpRequest, HttpResponse, RetryPolicy, Transport};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryDecision {
    /// Stop and return the error
    Fail,
    /// Invalidate the token and try again immediately
    RefreshAuth,
    /// Try again after waiting
    Retry(Duration),
}

/// HTTP provider for the campaign management API.
///
/// # Example
///
/// ```rust,no_run
/// use searchads::http::SearchAdsHttpProvider;
/// use searchads::auth::TokenManager;
/// use searchads::config::Credentials;
/// use searchads_transport::HttpTransport;
/// use std::sync::Arc;
///
/// # fn example() -> searchads::Result<()> {
/// let credentials = Credentials::load()?;
/// let transport = Arc::new(HttpTransport::new()?);
/// let tokens = Arc::new(TokenManager::from_credentials(&credentials, transport.clone())?);
///
/// let provider = SearchAdsHttpProvider::builder()
///     .transport(transport)
///     .token_source(tokens)
///     .org_id(credentials.org_id.clone())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SearchAdsHttpProvider {
    pub(crate) inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    /// Single-attempt HTTP seam
    pub(crate) transport: Arc<dyn Transport>,
    /// Bearer tokens
    pub(crate) tokens: Arc<dyn TokenSource>,
    /// API root without a trailing slash
    pub(crate) base_url: String,
    /// Org sent in `X-AP-Context`; `None` omits the header
    pub(crate) org_id: Option<String>,
    /// Retry schedule and limits
    pub(crate) retry_policy: RetryPolicy,
    /// Aborts the retry loop when triggered
    pub(crate) cancellation: Option<CancellationToken>,
}

impl fmt::Debug for ProviderInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderInner")
            .field("base_url", &self.base_url)
            .field("org_id", &self.org_id)
            .field("retry_policy", &self.retry_policy)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl SearchAdsHttpProvider {
    /// Create a new builder for configuring the provider.
    pub fn builder() -> SearchAdsHttpProviderBuilder {
        SearchAdsHttpProviderBuilder::default()
    }

    /// The organization sent with every request, if any.
    pub fn org_id(&self) -> Option<&str> {
        self.inner.org_id.as_deref()
    }

    fn build_request(&self, method: &Method, path: &str, token: &str, body: Option<&Bytes>) -> HttpRequest {
        let url = format!("{}{}", self.inner.base_url, path);
        let mut request = HttpRequest::new(method.clone(), url)
            .with_header("Authorization", format!("Bearer {}", token))
            .with_header("Accept", "application/json");

        if let Some(org) = &self.inner.org_id {
            request = request.with_header("X-AP-Context", format!("orgId={}", org));
        }
        if let Some(body) = body {
            request = request
                .with_header("Content-Type", "application/json")
                .with_body(body.clone());
        }
        request
    }

    /// One attempt: fetch a token, send, and turn non-2xx into [`ApiError`].
    async fn attempt(&self, method: &Method, path: &str, body: Option<&Bytes>) -> Result<HttpResponse> {
        let token = self.inner.tokens.token().await?;
        let request = self.build_request(method, path, &token, body);

        let response = self.inner.transport.send_http(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let mut api_error = ApiError::from_response(response.status, &response.body);
        if response.status == 429 || response.status >= 500 {
            api_error = api_error
                .with_retry_after(response.get_header("Retry-After").and_then(parse_retry_after));
        }
        Err(api_error.into())
    }

    fn decide(&self, error: &Error, safe: bool, attempt: u32, did_auth_refresh: bool) -> RetryDecision {
        let policy = &self.inner.retry_policy;
        match error {
            Error::Api(api) if api.status == 401 && !did_auth_refresh => RetryDecision::RefreshAuth,
            Error::Api(api) if api.status == 429 => {
                RetryDecision::Retry(policy.rate_limit_delay(attempt, api.retry_after))
            }
            Error::Api(api) if api.status >= 500 && safe => {
                RetryDecision::Retry(policy.server_error_delay(attempt, api.retry_after))
            }
            Error::Transport(e) if safe && RetryPolicy::is_retryable(e) => {
                RetryDecision::Retry(policy.backoff(attempt))
            }
            _ => RetryDecision::Fail,
        }
    }

    async fn run_cancellable<F, T>(&self, future: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>> + Send,
    {
        match &self.inner.cancellation {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(Error::Cancelled),
                result = future => result,
            },
            None => future.await,
        }
    }

    async fn pause(&self, wait: Duration) -> Result<()> {
        self.run_cancellable(async {
            tokio::time::sleep(wait).await;
            Ok(())
        })
        .await
    }

    async fn execute(&self, method: Method, path: &str, body: Option<Bytes>) -> Result<Bytes> {
        let max_attempts = self.inner.retry_policy.max_attempts();
        let safe = RetryPolicy::is_safe_to_retry(&method, path);
        let mut meta = RequestMetadata::new(method.as_str(), path);
        if let Some(body) = &body {
            meta = meta.with_body_size(body.len());
        }
        let timer = RequestTimer::start();

        let mut did_auth_refresh = false;
        let mut wait = Duration::ZERO;
        let mut last_error = None;

        for attempt in 0..max_attempts {
            if attempt > 0 && !wait.is_zero() {
                self.pause(wait).await?;
            }

            meta.log_attempt(attempt, max_attempts);
            let error = match self
                .run_cancellable(self.attempt(&method, path, body.as_ref()))
                .await
            {
                Ok(response) => {
                    ResponseMetadata::new(response.status, timer.elapsed())
                        .with_body_size(response.body.len())
                        .with_retries(attempt)
                        .log_success(&meta);
                    return Ok(response.body);
                }
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(error) => error,
            };

            match self.decide(&error, safe, attempt, did_auth_refresh) {
                RetryDecision::RefreshAuth => {
                    meta.log_auth_refresh();
                    did_auth_refresh = true;
                    self.inner.tokens.invalidate().await;
                    wait = Duration::ZERO;
                }
                RetryDecision::Retry(delay) => {
                    if attempt + 1 < max_attempts {
                        meta.log_retry(attempt, delay, &error.to_string());
                    }
                    wait = delay;
                }
                RetryDecision::Fail => {
                    ResponseMetadata::new(error.status().unwrap_or(0), timer.elapsed())
                        .with_retries(attempt)
                        .log_error(&meta, &error.to_string());
                    return Err(error);
                }
            }
            last_error = Some(error);
        }

        let source = last_error.unwrap_or_else(|| Error::Config("retry policy allows no attempts".to_string()));
        ResponseMetadata::new(source.status().unwrap_or(0), timer.elapsed())
            .with_retries(max_attempts.saturating_sub(1))
            .log_error(&meta, &source.to_string());
        Err(Error::MaxRetriesExceeded {
            attempts: max_attempts,
            source: Box::new(source),
        })
    }
}

#[async_trait]
impl HttpProvider for SearchAdsHttpProvider {
    async fn request(&self, method: Method, path: &str, body: Option<Body<'_>>) -> Result<Bytes> {
        // Buffered up front so every attempt re-sends identical bytes.
        let body = body.map(serialize_body).transpose()?;
        self.execute(method, path, body).await
    }

    fn base_url(&self) -> &str {
        &self.inner.base_url
    }
}

/// Builder for creating a `SearchAdsHttpProvider` with custom configuration.
#[derive(Default)]
pub struct SearchAdsHttpProviderBuilder {
    transport: Option<Arc<dyn Transport>>,
    tokens: Option<Arc<dyn TokenSource>>,
    base_url: Option<String>,
    org_id: Option<String>,
    retry_policy: Option<RetryPolicy>,
    cancellation: Option<CancellationToken>,
}

impl SearchAdsHttpProviderBuilder {
    /// Set the transport used for every attempt.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the bearer token source.
    pub fn token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Set the API root.
    ///
    /// Defaults to [`crate::DEFAULT_BASE_URL`].
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the organization. An empty string omits `X-AP-Context`.
    pub fn org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    /// Set the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Set a cancellation token for every operation.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the provider with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No transport or token source was set
    /// - The base URL is empty or not http/https
    pub fn build(self) -> Result<SearchAdsHttpProvider> {
        let transport = self
            .transport
            .ok_or_else(|| Error::Config("transport is required".to_string()))?;
        let tokens = self
            .tokens
            .ok_or_else(|| Error::Config("token source is required".to_string()))?;

        let base_url = validate_base_url(
            self.base_url
                .as_deref()
                .unwrap_or(crate::DEFAULT_BASE_URL),
        )?;

        let inner = Arc::new(ProviderInner {
            transport,
            tokens,
            base_url,
            org_id: self.org_id.filter(|org| !org.is_empty()),
            retry_policy: self.retry_policy.unwrap_or_default(),
            cancellation: self.cancellation,
        });

        Ok(SearchAdsHttpProvider { inner })
    }
}

fn validate_base_url(base_url: &str) -> Result<String> {
    if base_url.trim().is_empty() {
        return Err(Error::InvalidUrl("Base URL cannot be empty".to_string()));
    }

    let parsed: Url = base_url
        .parse()
        .map_err(|e| Error::InvalidUrl(format!("{}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(Error::InvalidUrl(format!(
                "Invalid URL scheme '{}'. Only 'http' and 'https' are supported.",
                scheme
            )));
        }
    }

    Ok(base_url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchads_transport::TransportError;

    #[derive(Debug)]
    struct NoTransport;

    #[async_trait]
    impl Transport for NoTransport {
        async fn send_http(&self, _request: HttpRequest) -> searchads_transport::Result<HttpResponse> {
            Err(TransportError::Other("unused".into()))
        }
    }

    #[derive(Debug)]
    struct FixedToken;

    #[async_trait]
    impl TokenSource for FixedToken {
        async fn token(&self) -> Result<String> {
            Ok("t0k".into())
        }

        async fn invalidate(&self) {}
    }

    fn provider(org: &str) -> SearchAdsHttpProvider {
        SearchAdsHttpProvider::builder()
            .transport(Arc::new(NoTransport))
            .token_source(Arc::new(FixedToken))
            .org_id(org)
            .build()
            .unwrap()
    }

    fn api(status: u16, retry_after: Option<u64>) -> Error {
        Error::Api(
            ApiError::from_response(status, b"{}")
                .with_retry_after(retry_after.map(Duration::from_secs)),
        )
    }

    #[test]
    fn test_builder_defaults() {
        let provider = provider("123");
        assert_eq!(provider.base_url(), crate::DEFAULT_BASE_URL);
        assert_eq!(provider.org_id(), Some("123"));
        assert_eq!(provider.inner.retry_policy, RetryPolicy::default());
    }

    #[test]
    fn test_builder_requires_transport_and_tokens() {
        let err = SearchAdsHttpProvider::builder().build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = SearchAdsHttpProvider::builder()
            .transport(Arc::new(NoTransport))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("token source"));
    }

    #[test]
    fn test_builder_rejects_bad_base_urls() {
        for (url, needle) in [("   ", "empty"), ("ftp://example.com", "ftp"), ("not a url", "")] {
            let err = SearchAdsHttpProvider::builder()
                .transport(Arc::new(NoTransport))
                .token_source(Arc::new(FixedToken))
                .base_url(url)
                .build()
                .unwrap_err();
            assert!(matches!(err, Error::InvalidUrl(ref m) if m.contains(needle)), "{url}: {err}");
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = SearchAdsHttpProvider::builder()
            .transport(Arc::new(NoTransport))
            .token_source(Arc::new(FixedToken))
            .base_url("http://localhost:8080/api/v5/")
            .build()
            .unwrap();

        let request = provider.build_request(&Method::GET, "/acls", "t", None);
        assert_eq!(request.url, "http://localhost:8080/api/v5/acls");
    }

    #[test]
    fn test_request_headers() {
        let provider = provider("555");
        let body = Bytes::from_static(b"{}");
        let request = provider.build_request(&Method::POST, "/campaigns/find", "abc", Some(&body));

        assert_eq!(request.get_header("Authorization"), Some("Bearer abc"));
        assert_eq!(request.get_header("Accept"), Some("application/json"));
        assert_eq!(request.get_header("X-AP-Context"), Some("orgId=555"));
        assert_eq!(request.get_header("Content-Type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_empty_org_omits_context_header() {
        let provider = provider("");
        let request = provider.build_request(&Method::GET, "/acls", "abc", None);

        assert_eq!(provider.org_id(), None);
        assert_eq!(request.get_header("X-AP-Context"), None);
        assert_eq!(request.get_header("Content-Type"), None);
    }

    #[test]
    fn test_decisions() {
        let p = provider("1");

        assert_eq!(p.decide(&api(401, None), true, 0, false), RetryDecision::RefreshAuth);
        assert_eq!(p.decide(&api(401, None), true, 1, true), RetryDecision::Fail);
        assert_eq!(
            p.decide(&api(429, None), false, 1, false),
            RetryDecision::Retry(Duration::from_secs(4))
        );
        assert_eq!(
            p.decide(&api(429, Some(1)), false, 3, false),
            RetryDecision::Retry(Duration::from_secs(1))
        );
        assert_eq!(
            p.decide(&api(503, Some(30)), true, 0, false),
            RetryDecision::Retry(Duration::from_secs(30))
        );
        assert_eq!(
            p.decide(&api(503, Some(1)), true, 2, false),
            RetryDecision::Retry(Duration::from_secs(8))
        );
        assert_eq!(p.decide(&api(500, None), false, 0, false), RetryDecision::Fail);
        assert_eq!(p.decide(&api(404, None), true, 0, false), RetryDecision::Fail);
        assert_eq!(
            p.decide(&Error::Transport(TransportError::Timeout), true, 0, false),
            RetryDecision::Retry(Duration::from_secs(2))
        );
        assert_eq!(
            p.decide(&Error::Transport(TransportError::Timeout), false, 0, false),
            RetryDecision::Fail
        );
        assert_eq!(
            p.decide(&Error::Authentication("bad".into()), true, 0, false),
            RetryDecision::Fail
        );
    }
}
