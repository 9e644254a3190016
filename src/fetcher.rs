//! Page fetcher abstraction for retrieving HTML content.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Result;

/// Browser-like user agent sent with every search request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122 Safari/537.36";

/// Accept header sent with every search request.
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Retry budget and linear backoff for failed fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Additional attempts after the first one fails.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay unit; the wait after failed attempt `n` (0-based) is `base_delay * (n + 1)`.
    #[serde(default = "default_base_delay", with = "millis")]
    pub base_delay: Duration,
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay() -> Duration {
    Duration::from_millis(500)
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay: default_base_delay(),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Returns the delay to wait after the given failed attempt (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1)
    }

    /// Runs `op` until it succeeds or the retry budget is spent.
    ///
    /// The last attempt's error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_retries => return Err(e),
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Fetch of {} failed (attempt {}/{}): {}; retrying in {:?}",
                        label,
                        attempt + 1,
                        self.max_retries + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Settings for an HTTP page fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Accept header value.
    #[serde(default = "default_accept")]
    pub accept: String,
    /// Per-attempt request timeout.
    #[serde(default = "default_timeout", with = "millis")]
    pub timeout: Duration,
    /// Retry behaviour on failure.
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_accept() -> String {
    DEFAULT_ACCEPT.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept: default_accept(),
            timeout: default_timeout(),
            retry: RetryPolicy::default(),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Trait for fetching the raw HTML of a search results page.
///
/// Headers, timeouts and retries are set at construction time; `fetch` is a
/// simple URL-in, HTML-out interface that returns the final error once
/// retries are exhausted.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the HTML content of the given URL.
    async fn fetch(&self, url: &str) -> Result<String>;
}
