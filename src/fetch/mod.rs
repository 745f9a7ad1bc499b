//! Image fetching
//!
//! - [`resolve_url`] / [`extract_extension`] turn a stored path into a request
//!   URL and a local file extension
//! - [`ImageFetcher`] is the seam the batch runner fetches through;
//!   [`HttpFetcher`] is the reqwest-backed implementation

use crate::config::{Config, RetryConfig};
use crate::error::{Error, FetchError, Result};
use crate::retry::with_retry;
use async_trait::async_trait;
use std::time::Duration;

mod resolve;

pub use resolve::{DEFAULT_EXTENSION, extract_extension, resolve_url};

/// Fetches raw image bytes for a URL
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Perform the request and return the body
    ///
    /// Transport errors, non-2xx statuses, timeouts and empty bodies are all
    /// reported as [`FetchError`].
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

/// HTTP GET fetcher with a per-request timeout
///
/// Makes one attempt per call unless the retry policy allows more.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    retry: RetryConfig,
}

impl HttpFetcher {
    /// Create a fetcher with an explicit timeout and retry policy
    pub fn new(timeout: Duration, retry: RetryConfig, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            client,
            timeout,
            retry,
        })
    }

    /// Create a fetcher from the run configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.download_timeout,
            config.retry.clone(),
            &config.user_agent,
        )
    }

    async fn fetch_once(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        if body.is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        tracing::debug!(url, bytes = body.len(), "image fetched");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        with_retry(&self.retry, || self.fetch_once(url)).await
    }
}
