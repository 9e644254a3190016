//! HTTP-based page fetcher using reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use tracing::debug;

use crate::fetcher::{FetcherConfig, PageFetcher, RetryPolicy};
use crate::{Result, SearchError};

/// A page fetcher that issues plain HTTP GETs with browser-like headers.
///
/// Timeouts, connection failures and non-2xx statuses all count as failed
/// attempts and are retried according to the configured [`RetryPolicy`].
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    /// Creates a new `HttpFetcher` from the given settings.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let accept = HeaderValue::from_str(&config.accept)
            .map_err(|e| SearchError::Other(format!("Invalid Accept header: {}", e)))?;
        headers.insert(ACCEPT, accept);

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            retry: config.retry,
        })
    }

    /// Creates an `HttpFetcher` with a custom reqwest client.
    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let html = response.text().await?;
        debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.retry.run(url, || self.fetch_once(url)).await
    }
}
