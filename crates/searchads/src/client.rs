//! Main client for the campaign management API

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use searchads_protocol::{ApiListResponse, ApiResponse, PageDetail, Selector};
use searchads_transport::{HttpTransport, HttpTransportConfig, RetryPolicy, Transport};

use crate::{
    auth::{TokenManager, TokenSource},
    config::{ClientConfig, ClientConfigBuilder, Credentials},
    error::{Error, Result},
    http::{HttpProvider, SearchAdsHttpProvider},
    pagination::{collect_all_offset_paginated, collect_all_selector_paginated},
};

/// Main client for the campaign management API.
///
/// Wraps an [`HttpProvider`] and decodes the `{data, pagination}` envelopes
/// the API answers with. Cloning is cheap and clones share the token cache.
///
/// # Example
///
/// ```rust,no_run
/// use searchads::{Client, ClientConfig};
///
/// # async fn example() -> searchads::Result<()> {
/// let client = Client::from_config(ClientConfig::from_env()?)?;
/// let campaign: Option<serde_json::Value> = client.get_data("/campaigns/123").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    /// HTTP provider for making requests (handles auth, retries, etc.)
    provider: Arc<dyn HttpProvider>,
}

impl Client {
    /// Create a new client builder for advanced configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from `~/.aads/config.yaml` and `AADS_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Create a client with a custom HTTP provider.
    ///
    /// Used to put a test double or a differently configured provider
    /// behind the typed helpers.
    pub fn from_provider(provider: Arc<dyn HttpProvider>) -> Self {
        Self {
            inner: Arc::new(ClientInner { provider }),
        }
    }

    /// Create a client from a configuration object.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The private key cannot be read or is not a P-256 key
    /// - The base URL is empty or not http/https
    /// - The HTTP client cannot be initialized
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::with_config(HttpTransportConfig {
            timeout: config.timeout,
            ..Default::default()
        })?);

        let mut tokens = TokenManager::from_credentials(&config.credentials, transport.clone())?;
        if let Some(token_url) = &config.token_url {
            tokens = tokens.with_token_url(token_url.clone());
        }
        let tokens: Arc<dyn TokenSource> = Arc::new(tokens);

        let mut builder = SearchAdsHttpProvider::builder()
            .transport(transport)
            .token_source(tokens)
            .retry_policy(config.retry_policy.clone());
        if let Some(org) = config.effective_org_id() {
            builder = builder.org_id(org);
        }
        if let Some(base_url) = config.base_url {
            builder = builder.base_url(base_url);
        }
        if let Some(token) = config.cancellation {
            builder = builder.cancellation_token(token);
        }

        Ok(Self::from_provider(Arc::new(builder.build()?)))
    }

    /// The provider requests go through.
    pub fn provider(&self) -> &Arc<dyn HttpProvider> {
        &self.inner.provider
    }

    /// The API root requests are sent to.
    pub fn base_url(&self) -> &str {
        self.inner.provider.base_url()
    }

    /// `GET path`, returning the raw response body.
    pub async fn get(&self, path: &str) -> Result<Bytes> {
        self.inner.provider.get(path).await
    }

    /// `POST path` with a JSON body, returning the raw response body.
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<Bytes>
    where
        B: Serialize + Send + Sync,
    {
        self.inner.provider.post(path, body).await
    }

    /// `PUT path` with a JSON body, returning the raw response body.
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<Bytes>
    where
        B: Serialize + Send + Sync,
    {
        self.inner.provider.put(path, body).await
    }

    /// `DELETE path`, returning the raw response body.
    pub async fn delete(&self, path: &str) -> Result<Bytes> {
        self.inner.provider.delete(path).await
    }

    /// Bulk delete through a `POST` with a body.
    pub async fn delete_with_body<B>(&self, path: &str, body: &B) -> Result<Bytes>
    where
        B: Serialize + Send + Sync,
    {
        self.inner.provider.delete_with_body(path, body).await
    }

    /// `GET path` and decode the `data` field.
    pub async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let body = self.get(path).await?;
        decode_data(&body)
    }

    /// `POST path` and decode the `data` field.
    pub async fn post_data<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + Send + Sync,
    {
        let body = self.post(path, body).await?;
        decode_data(&body)
    }

    /// `PUT path` and decode the `data` field.
    pub async fn put_data<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + Send + Sync,
    {
        let body = self.put(path, body).await?;
        decode_data(&body)
    }

    /// Fetch one page of a listing.
    ///
    /// `limit` and `offset` are added as query parameters when positive.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<T>, Option<PageDetail>)> {
        let body = self.get(&with_page_params(path, limit, offset)).await?;
        decode_list(&body)
    }

    /// Fetch one page of a `/find` search.
    pub async fn find<T: DeserializeOwned>(
        &self,
        path: &str,
        selector: &Selector,
    ) -> Result<(Vec<T>, Option<PageDetail>)> {
        let body = self.post(path, selector).await?;
        decode_list(&body)
    }

    /// Fetch every page of a listing, starting at `start_offset`.
    pub async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        page_size: i64,
        start_offset: i64,
    ) -> Result<Vec<T>> {
        collect_all_offset_paginated(page_size, start_offset, move |limit, offset| {
            self.get_list(path, limit, offset)
        })
        .await
    }

    /// Fetch every page of a `/find` search. `selector` is left untouched.
    pub async fn find_all<T: DeserializeOwned>(
        &self,
        path: &str,
        selector: &Selector,
        page_size: i64,
    ) -> Result<Vec<T>> {
        collect_all_selector_paginated(selector, page_size, move |page| async move {
            self.find(path, &page).await
        })
        .await
    }
}

fn decode_data<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let envelope: ApiResponse<T> =
        serde_json::from_slice(body).map_err(|e| Error::ResponseParse(e.to_string()))?;
    Ok(envelope.data)
}

fn decode_list<T: DeserializeOwned>(body: &[u8]) -> Result<(Vec<T>, Option<PageDetail>)> {
    let envelope: ApiListResponse<T> =
        serde_json::from_slice(body).map_err(|e| Error::ResponseParse(e.to_string()))?;
    Ok((envelope.data, envelope.pagination))
}

fn with_page_params(path: &str, limit: i64, offset: i64) -> String {
    let mut params = Vec::new();
    if limit > 0 {
        params.push(format!("limit={}", limit));
    }
    if offset > 0 {
        params.push(format!("offset={}", offset));
    }
    if params.is_empty() {
        return path.to_string();
    }

    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, sep, params.join("&"))
}

/// Builder for creating a configured Client.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfigBuilder,
}

impl ClientBuilder {
    /// Set the account credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config = self.config.credentials(credentials);
        self
    }

    /// Set the base URL for the API.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.base_url(base_url);
        self
    }

    /// Set the OAuth2 token endpoint.
    pub fn token_url(mut self, token_url: impl Into<String>) -> Self {
        self.config = self.config.token_url(token_url);
        self
    }

    /// Set the timeout for each HTTP attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Override the organization. An empty string omits `X-AP-Context`.
    pub fn org_id(mut self, org_id: impl Into<String>) -> Self {
        self.config = self.config.org_id(org_id);
        self
    }

    /// Set the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config = self.config.retry_policy(policy);
        self
    }

    /// Abort in-flight operations when `token` is cancelled.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.config = self.config.cancellation_token(token);
        self
    }

    /// Build the client with the configured options.
    pub fn build(self) -> Result<Client> {
        Client::from_config(self.config.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Body, Method};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::sync::Mutex;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Campaign {
        id: i64,
        name: String,
    }

    /// Provider double serving canned bodies and recording requests.
    #[derive(Debug, Default)]
    struct CannedProvider {
        bodies: Mutex<VecDeque<&'static str>>,
        seen: Mutex<Vec<(Method, String, Option<serde_json::Value>)>>,
    }

    impl CannedProvider {
        fn new(bodies: &[&'static str]) -> Arc<Self> {
            Arc::new(Self {
                bodies: Mutex::new(bodies.iter().copied().collect()),
                seen: Mutex::default(),
            })
        }

        fn seen(&self) -> Vec<(Method, String, Option<serde_json::Value>)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpProvider for CannedProvider {
        async fn request(&self, method: Method, path: &str, body: Option<Body<'_>>) -> Result<Bytes> {
            let body = body.map(|b| serde_json::to_value(b).unwrap());
            self.seen.lock().unwrap().push((method, path.to_string(), body));
            let next = self.bodies.lock().unwrap().pop_front().unwrap_or("");
            Ok(Bytes::from_static(next.as_bytes()))
        }

        fn base_url(&self) -> &str {
            "http://canned"
        }
    }

    #[rstest::rstest]
    #[case("/campaigns", 0, 0, "/campaigns")]
    #[case("/campaigns", 50, 0, "/campaigns?limit=50")]
    #[case("/campaigns", 50, 100, "/campaigns?limit=50&offset=100")]
    #[case("/campaigns", 0, 100, "/campaigns?offset=100")]
    #[case("/reports?granularity=DAILY", 20, 40, "/reports?granularity=DAILY&limit=20&offset=40")]
    fn test_with_page_params(
        #[case] path: &str,
        #[case] limit: i64,
        #[case] offset: i64,
        #[case] expected: &str,
    ) {
        assert_eq!(with_page_params(path, limit, offset), expected);
    }

    #[tokio::test]
    async fn test_get_data_decodes_envelope() {
        let provider = CannedProvider::new(&[r#"{"data":{"id":7,"name":"Spring"}}"#]);
        let client = Client::from_provider(provider.clone());

        let campaign: Option<Campaign> = client.get_data("/campaigns/7").await.unwrap();

        assert_eq!(
            campaign,
            Some(Campaign {
                id: 7,
                name: "Spring".into()
            })
        );
        assert_eq!(provider.seen()[0].0, Method::GET);
        assert_eq!(provider.seen()[0].1, "/campaigns/7");
    }

    #[tokio::test]
    async fn test_get_data_empty_body_is_none() {
        let client = Client::from_provider(CannedProvider::new(&[""]));
        let data: Option<Campaign> = client.get_data("/campaigns/7").await.unwrap();
        assert_eq!(data, None);
    }

    #[tokio::test]
    async fn test_put_data_sends_body() {
        let provider = CannedProvider::new(&[r#"{"data":{"id":7,"name":"Renamed"}}"#]);
        let client = Client::from_provider(provider.clone());

        let update = serde_json::json!({"campaign": {"name": "Renamed"}});
        let campaign: Option<Campaign> = client.put_data("/campaigns/7", &update).await.unwrap();

        assert_eq!(campaign.unwrap().name, "Renamed");
        let (method, _, body) = &provider.seen()[0];
        assert_eq!(method, &Method::PUT);
        assert_eq!(body.as_ref(), Some(&update));
    }

    #[tokio::test]
    async fn test_parse_failure_is_response_parse() {
        let client = Client::from_provider(CannedProvider::new(&["<html>"]));
        let err = client.get_data::<Campaign>("/campaigns/7").await.unwrap_err();
        assert!(matches!(err, Error::ResponseParse(_)));
        assert!(err.to_string().starts_with("parse response: "));
    }

    #[tokio::test]
    async fn test_list_all_follows_pages() {
        let provider = CannedProvider::new(&[
            r#"{"data":[{"id":1,"name":"a"},{"id":2,"name":"b"}],"pagination":{"totalResults":3,"startIndex":0,"itemsPerPage":2}}"#,
            r#"{"data":[{"id":3,"name":"c"}],"pagination":{"totalResults":3,"startIndex":2,"itemsPerPage":2}}"#,
        ]);
        let client = Client::from_provider(provider.clone());

        let all: Vec<Campaign> = client.list_all("/campaigns", 2, 0).await.unwrap();

        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        let paths: Vec<String> = provider.seen().into_iter().map(|(_, p, _)| p).collect();
        assert_eq!(paths, vec!["/campaigns?limit=2", "/campaigns?limit=2&offset=2"]);
    }

    #[tokio::test]
    async fn test_find_all_posts_selector_pages() {
        let provider = CannedProvider::new(&[
            r#"{"data":[{"id":1,"name":"a"},{"id":2,"name":"b"}]}"#,
            r#"{"data":[{"id":3,"name":"c"}]}"#,
        ]);
        let client = Client::from_provider(provider.clone());
        let selector = Selector::new().with_field("id");

        let all: Vec<Campaign> = client
            .find_all("/campaigns/find", &selector, 2)
            .await
            .unwrap();

        assert_eq!(all.len(), 3);
        assert_eq!(selector.pagination, None);

        let seen = provider.seen();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(m, p, _)| *m == Method::POST && p == "/campaigns/find"));
        assert_eq!(
            seen[1].2.as_ref().unwrap()["pagination"],
            serde_json::json!({"offset": 2, "limit": 2})
        );
    }

    #[tokio::test]
    async fn test_delete_with_body_is_post() {
        let provider = CannedProvider::new(&[""]);
        let client = Client::from_provider(provider.clone());

        client
            .delete_with_body("/campaigns/1/adgroups/2/targetingkeywords/delete/bulk", &vec![5, 6])
            .await
            .unwrap();

        let (method, _, body) = &provider.seen()[0];
        assert_eq!(method, &Method::POST);
        assert_eq!(body.as_ref(), Some(&serde_json::json!([5, 6])));
    }

    fn key_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(include_str!("../tests/fixtures/ec_pkcs8.pem").as_bytes())
            .unwrap();
        file
    }

    fn credentials(key: &tempfile::NamedTempFile) -> Credentials {
        Credentials {
            client_id: "SEARCHADS.client".into(),
            team_id: "SEARCHADS.team".into(),
            key_id: "key".into(),
            org_id: "123".into(),
            private_key_path: key.path().display().to_string(),
            default_currency: String::new(),
        }
    }

    #[test]
    fn test_from_config_defaults() {
        let key = key_file();
        let client = Client::builder().credentials(credentials(&key)).build().unwrap();
        assert_eq!(client.base_url(), crate::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_config_invalid_scheme() {
        let key = key_file();
        let result = Client::builder()
            .credentials(credentials(&key))
            .base_url("ftp://invalid.example.com")
            .build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_from_config_missing_key() {
        let result = Client::builder()
            .credentials(Credentials {
                private_key_path: "/nonexistent/key.pem".into(),
                ..Default::default()
            })
            .build();
        assert!(matches!(result, Err(Error::KeyLoad(_))));
    }

    #[test]
    fn test_client_clone_shares_provider() {
        let client = Client::from_provider(CannedProvider::new(&[]));
        let clone = client.clone();
        assert!(Arc::ptr_eq(client.provider(), clone.provider()));
    }
}
