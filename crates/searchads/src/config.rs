//! Configuration for the searchads client
//!
//! [`Credentials`] are the identifiers and key path needed to authenticate,
//! read from `~/.aads/config.yaml` and overridden by `AADS_*` environment
//! variables. [`ClientConfig`] adds the transport-level knobs.

use crate::error::{Error, Result};
use searchads_transport::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const CONFIG_DIR: &str = ".aads";
const CONFIG_FILE: &str = "config.yaml";

/// Account identifiers and the signing key location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// OAuth2 client identifier
    #[serde(default)]
    pub client_id: String,
    /// Team identifier, the assertion issuer
    #[serde(default)]
    pub team_id: String,
    /// Key identifier placed in the assertion header
    #[serde(default)]
    pub key_id: String,
    /// Organization sent in `X-AP-Context`
    #[serde(default)]
    pub org_id: String,
    /// Path to the PEM-encoded EC private key
    #[serde(default)]
    pub private_key_path: String,
    /// Currency for money fields built from user input
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_currency: String,
}

impl Credentials {
    /// Default location of the credentials file, `~/.aads/config.yaml`.
    pub fn default_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
            .ok_or_else(|| Error::Config("get home dir: not found".to_string()))
    }

    /// Load from the default file, then apply environment overrides.
    ///
    /// A missing file is not an error, so env-only setups work.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Load from an explicit file, then apply environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut creds = match std::fs::read_to_string(path) {
            Ok(text) if !text.trim().is_empty() => serde_yaml::from_str(&text)
                .map_err(|e| Error::Config(format!("parse config: {}", e)))?,
            Ok(_) => Self::default(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(Error::Config(format!(
                    "read config {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        creds.apply_env();
        creds.private_key_path = expand_home(&creds.private_key_path);

        tracing::debug!(path = %path.display(), "Loaded credentials");
        Ok(creds)
    }

    fn apply_env(&mut self) {
        override_from_env(&mut self.client_id, "AADS_CLIENT_ID");
        override_from_env(&mut self.team_id, "AADS_TEAM_ID");
        override_from_env(&mut self.key_id, "AADS_KEY_ID");
        override_from_env(&mut self.org_id, "AADS_ORG_ID");
        override_from_env(&mut self.private_key_path, "AADS_PRIVATE_KEY_PATH");
        override_from_env(&mut self.default_currency, "AADS_DEFAULT_CURRENCY");
        // Shorter alias, applied last so it wins.
        override_from_env(&mut self.default_currency, "AADS_CURRENCY");
    }

    /// Check everything needed to obtain a token.
    pub fn validate_auth(&self) -> Result<()> {
        require(&self.client_id, "client_id")?;
        require(&self.team_id, "team_id")?;
        require(&self.key_id, "key_id")?;
        require(&self.private_key_path, "private_key_path")?;

        std::fs::metadata(&self.private_key_path).map_err(|e| {
            Error::Config(format!(
                "private key not found at {}: {}",
                self.private_key_path, e
            ))
        })?;
        Ok(())
    }

    /// Check everything needed to call org-scoped endpoints.
    pub fn validate(&self) -> Result<()> {
        self.validate_auth()?;
        require(&self.org_id, "org_id")
    }
}

fn require(value: &str, name: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Config(format!("{} is required", name)));
    }
    Ok(())
}

fn override_from_env(field: &mut String, var: &str) {
    if let Ok(value) = std::env::var(var)
        && !value.is_empty()
    {
        *field = value;
    }
}

/// Expand a leading `~` or `~/` to the home directory.
pub(crate) fn expand_home(path: &str) -> String {
    let Some(home) = dirs::home_dir() else {
        return path.to_string();
    };

    if path == "~" {
        return home.to_string_lossy().into_owned();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest).to_string_lossy().into_owned(),
        None => path.to_string(),
    }
}

/// Configuration for the searchads client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Account identifiers and key path
    pub credentials: Credentials,

    /// API root; defaults to [`crate::DEFAULT_BASE_URL`]
    pub base_url: Option<String>,

    /// OAuth2 token endpoint; defaults to [`crate::DEFAULT_TOKEN_URL`]
    pub token_url: Option<String>,

    /// Timeout for each HTTP attempt
    pub timeout: Duration,

    /// Org override. `Some("")` sends no `X-AP-Context` header.
    pub org_id: Option<String>,

    /// Retry schedule and limits
    pub retry_policy: RetryPolicy,

    /// Aborts in-flight operations, including backoff sleeps
    pub cancellation: Option<CancellationToken>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            base_url: None,
            token_url: None,
            timeout: Duration::from_secs(30),
            org_id: None,
            retry_policy: RetryPolicy::default(),
            cancellation: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given credentials.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Default::default()
        }
    }

    /// Load credentials from `~/.aads/config.yaml` and the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_credentials(Credentials::load()?))
    }

    /// Create a new builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Override the organization for every request.
    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    /// The organization to send, or `None` when the header is omitted.
    pub fn effective_org_id(&self) -> Option<&str> {
        let org = self
            .org_id
            .as_deref()
            .unwrap_or(self.credentials.org_id.as_str());
        (!org.is_empty()).then_some(org)
    }
}

/// Builder for creating ClientConfig with a fluent API.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = credentials;
        self
    }

    /// Set the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set the OAuth2 token endpoint.
    pub fn token_url(mut self, token_url: impl Into<String>) -> Self {
        self.config.token_url = Some(token_url.into());
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Override the organization. An empty string omits `X-AP-Context`.
    pub fn org_id(mut self, org_id: impl Into<String>) -> Self {
        self.config.org_id = Some(org_id.into());
        self
    }

    /// Set the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry_policy = policy;
        self
    }

    /// Set a cancellation token observed by every operation.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.config.cancellation = Some(token);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
