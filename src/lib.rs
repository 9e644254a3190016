//! # meta-search-api
//!
//! A small multi-engine web search aggregator.
//!
//! A query is sent to each configured engine (Google, Naver, Bing), the
//! returned HTML is parsed into normalized `{title, url, snippet}` records by
//! engine-specific selector sets, results are tagged with the engine's site,
//! merged in engine order, capped, and cached for a fixed TTL. The
//! [`server`] module exposes this over `GET /search?q=...`.
//!
//! - Sequential or concurrent engine fan-out with deterministic ordering
//! - Whole-request or per-engine failure handling
//! - Retrying HTTP fetcher with linear backoff
//! - Versioned, data-driven parser selectors
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use meta_search_api::{
//!     engines::ParserRegistry, Aggregator, FetcherConfig, HttpFetcher, ResultCache,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = Arc::new(HttpFetcher::new(&FetcherConfig::default())?);
//!     let aggregator = Aggregator::new(
//!         fetcher,
//!         ParserRegistry::with_defaults()?,
//!         Arc::new(ResultCache::default()),
//!     );
//!
//!     let outcome = aggregator.search("kyoto").await?;
//!     for result in &outcome.results {
//!         println!("[{}] {}: {}", result.site, result.title, result.url);
//!     }
//!     Ok(())
//! }
//! ```

mod aggregator;
mod cache;
mod engine;
mod error;
mod fetcher;
mod fetcher_http;
mod result;

pub mod engines;
pub mod server;

#[cfg(test)]
mod test_utils;

pub use aggregator::{
    Aggregator, AggregatorConfig, EngineWarning, FailureMode, FanOut, ResultCache,
    SearchOutcome, DEFAULT_RESULT_CAP, MISSING_QUERY,
};
pub use cache::{TtlCache, DEFAULT_TTL};
pub use engine::{build_search_url, default_targets, EngineKind, EngineTarget};
pub use error::{Result, SearchError};
pub use fetcher::{FetcherConfig, PageFetcher, RetryPolicy, DEFAULT_ACCEPT, DEFAULT_USER_AGENT};
pub use fetcher_http::HttpFetcher;
pub use result::{truncate_snippet, SearchResult, SNIPPET_MAX_CHARS};
