//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use searchads::auth::TokenSource;
use searchads::config::Credentials;
use searchads::{RetryPolicy, SearchAdsHttpProvider};
use searchads_transport::{HttpRequest, HttpResponse, Transport, TransportError};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// PKCS#8 P-256 key used to sign test assertions
pub const TEST_KEY_PEM: &str = include_str!("../fixtures/ec_pkcs8.pem");

/// One scripted outcome of a transport call
#[derive(Debug)]
pub enum Step {
    /// Answer with a status, headers and body
    Respond(u16, Vec<(&'static str, String)>, String),
    /// Fail at the transport level
    Fail(TransportError),
}

impl Step {
    /// A response with a JSON body and no extra headers
    pub fn json(status: u16, body: &str) -> Self {
        Step::Respond(status, Vec::new(), body.to_string())
    }

    /// A response carrying a `Retry-After` header
    pub fn retry_after(status: u16, seconds: u64) -> Self {
        Step::Respond(
            status,
            vec![("Retry-After", seconds.to_string())],
            r#"{"error":{"errors":[{"messageCode":"RETRY","message":"try later"}]}}"#.to_string(),
        )
    }
}

/// In-memory transport answering from a script, recording every request.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Create a transport that replays `steps` in order
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            requests: Mutex::default(),
        })
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_http(&self, request: HttpRequest) -> searchads_transport::Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(status, headers, body)) => {
                let headers: HashMap<String, String> = headers
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect();
                Ok(HttpResponse::new(status, headers, body))
            }
            Some(Step::Fail(error)) => Err(error),
            None => Err(TransportError::Other("script exhausted".into())),
        }
    }
}

/// Token source handing out `token-N`, where N counts invalidations.
#[derive(Debug, Default)]
pub struct CountingTokens {
    invalidations: AtomicUsize,
    issued: AtomicUsize,
}

impl CountingTokens {
    /// Create a new token source
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// How many times the engine invalidated the token
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }

    /// How many tokens were handed out
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for CountingTokens {
    async fn token(&self) -> searchads::Result<String> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(format!("token-{}", self.invalidations()))
    }

    async fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Provider over a scripted transport with the default retry policy
pub fn scripted_provider(
    transport: Arc<ScriptedTransport>,
    tokens: Arc<CountingTokens>,
) -> SearchAdsHttpProvider {
    SearchAdsHttpProvider::builder()
        .transport(transport)
        .token_source(tokens)
        .base_url("https://api.test/api/v5")
        .org_id("4242")
        .build()
        .unwrap()
}

/// Retry policy with millisecond delays, for tests on a real clock
pub fn fast_retry_policy() -> RetryPolicy {
    RetryPolicy::builder()
        .initial_delay(Duration::from_millis(1))
        .max_delay(Duration::from_millis(5))
        .build()
}

/// Write the test key to a temporary file
pub fn key_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TEST_KEY_PEM.as_bytes()).unwrap();
    file
}

/// Credentials pointing at `key`
pub fn credentials(key: &tempfile::NamedTempFile) -> Credentials {
    Credentials {
        client_id: "SEARCHADS.test-client".into(),
        team_id: "SEARCHADS.test-team".into(),
        key_id: "test-key-id".into(),
        org_id: "4242".into(),
        private_key_path: key.path().display().to_string(),
        default_currency: "USD".into(),
    }
}
