//! HTTP client with connection pooling

use llvmpkg_config::NetworkConfig;
use llvmpkg_errors::{Error, NetworkError};
use reqwest::{Client, Response};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600), // release tarballs are large
            connect_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 4,
            user_agent: format!("llvmpkg/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        let defaults = Self::default();
        Self {
            timeout: Duration::from_secs(config.timeout),
            connect_timeout: Duration::from_secs(config.connect_timeout),
            user_agent: config.user_agent.clone().unwrap_or(defaults.user_agent),
            ..defaults
        }
    }
}

/// HTTP client wrapper
///
/// Requests are attempted once; transport failures are classified into
/// [`NetworkError`] variants.
#[derive(Clone)]
pub struct NetClient {
    client: Client,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: &NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(&NetConfig::default())
    }

    /// Execute a GET request
    ///
    /// The response is returned whatever its status; callers decide which
    /// statuses are acceptable.
    ///
    /// # Errors
    ///
    /// Returns an error on timeouts, connection failures or other transport errors.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, &e))
    }
}

/// Map a transport error onto the network error taxonomy
pub(crate) fn classify(url: &str, error: &reqwest::Error) -> Error {
    if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
        .into()
    } else if error.is_connect() {
        NetworkError::ConnectionRefused(format!("{url}: {error}")).into()
    } else {
        NetworkError::DownloadFailed(format!("{url}: {error}")).into()
    }
}
