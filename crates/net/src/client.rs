//! HTTP client with connection pooling

use nbs_errors::{Error, NetworkError};
use reqwest::{Client, Response};
use std::time::Duration;

use crate::classify::request_error;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Per-read timeout, applied to the response head and to each body chunk
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    /// Write buffer size for streamed downloads
    pub chunk_size: usize,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            connect_timeout: Duration::from_secs(20),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            chunk_size: nbs_config::constants::DEFAULT_CHUNK_SIZE,
            user_agent: nbs_config::constants::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<&nbs_config::Config> for NetConfig {
    fn from(config: &nbs_config::Config) -> Self {
        Self {
            timeout: config.network.timeout(),
            connect_timeout: config.network.connect_timeout(),
            chunk_size: config.download.chunk_size,
            user_agent: config.network.user_agent.clone(),
            ..Self::default()
        }
    }
}

/// HTTP client wrapper
///
/// Cloning is cheap; clones share the connection pool. Requests are issued
/// once: retrying is the caller's decision.
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .read_timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ClientBuild(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Execute a GET request and require a 2xx status
    ///
    /// # Errors
    ///
    /// Returns a classified `NetworkError` for transport failures and an
    /// `HttpError` for non-success statuses.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        Ok(response)
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Get the underlying reqwest client for advanced usage
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for NetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
