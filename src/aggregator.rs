//! Multi-engine aggregation: cache lookup, per-engine fetch and parse, merge.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::engine::default_targets;
use crate::engines::ParserRegistry;
use crate::fetcher::PageFetcher;
use crate::{EngineTarget, Result, SearchError, SearchResult};

/// Error message for a missing or blank query.
pub const MISSING_QUERY: &str = "Missing q query parameter";

/// Default maximum number of merged results.
pub const DEFAULT_RESULT_CAP: usize = 10;

/// Cache of merged, truncated result lists keyed by trimmed query.
pub type ResultCache = TtlCache<Vec<SearchResult>>;

/// How an engine failure affects the rest of the aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// The first failing engine fails the whole request.
    #[default]
    Abort,
    /// Failing engines are skipped and reported as warnings.
    Isolate,
}

/// How engine fetches within one aggregation are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanOut {
    /// One engine at a time, in target order.
    #[default]
    Sequential,
    /// All engines at once; results are still merged in target order.
    Concurrent,
}

/// Aggregation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Maximum number of merged results returned and cached.
    #[serde(default = "default_result_cap")]
    pub result_cap: usize,
    #[serde(default)]
    pub failure_mode: FailureMode,
    #[serde(default)]
    pub fan_out: FanOut,
}

fn default_result_cap() -> usize {
    DEFAULT_RESULT_CAP
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            result_cap: DEFAULT_RESULT_CAP,
            failure_mode: FailureMode::default(),
            fan_out: FanOut::default(),
        }
    }
}

/// An engine that failed during an isolated aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineWarning {
    /// Target name of the failed engine.
    pub engine: String,
    /// Description of the failure.
    pub message: String,
}

/// Result of one aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Merged results, at most `result_cap` long.
    pub results: Vec<SearchResult>,
    /// Engines that failed; only ever populated under [`FailureMode::Isolate`].
    pub warnings: Vec<EngineWarning>,
    /// Whether the results came from the cache.
    pub cached: bool,
}

impl SearchOutcome {
    /// Returns true if at least one engine failed.
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Tags each engine's results with its target name, concatenates them in
/// the given order and keeps the first `cap`.
fn merge_results(engine_results: Vec<(String, Vec<SearchResult>)>, cap: usize) -> Vec<SearchResult> {
    engine_results
        .into_iter()
        .flat_map(|(site, results)| {
            results
                .into_iter()
                .map(move |result| result.with_site(site.clone()))
        })
        .take(cap)
        .collect()
}

/// Queries every configured engine for a search and merges the results.
pub struct Aggregator {
    targets: Vec<EngineTarget>,
    fetcher: Arc<dyn PageFetcher>,
    parsers: ParserRegistry,
    cache: Arc<ResultCache>,
    config: AggregatorConfig,
}

impl Aggregator {
    /// Creates an aggregator over the default engine targets.
    pub fn new(fetcher: Arc<dyn PageFetcher>, parsers: ParserRegistry, cache: Arc<ResultCache>) -> Self {
        Self {
            targets: default_targets(),
            fetcher,
            parsers,
            cache,
            config: AggregatorConfig::default(),
        }
    }

    /// Replaces the engine targets.
    pub fn with_targets(mut self, targets: Vec<EngineTarget>) -> Self {
        self.targets = targets;
        self
    }

    /// Replaces the aggregation settings.
    pub fn with_config(mut self, config: AggregatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the engine targets, in merge order.
    pub fn targets(&self) -> &[EngineTarget] {
        &self.targets
    }

    /// Returns the aggregation settings.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Returns the result cache.
    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Performs an aggregated search.
    ///
    /// Blank queries are rejected with [`SearchError::InvalidQuery`] before
    /// any engine is contacted. A cached result list is returned without
    /// network activity. Otherwise each target is fetched and parsed, results
    /// are merged in target order, truncated to the result cap and cached.
    /// Partial results (some engines failed under [`FailureMode::Isolate`])
    /// are returned but not cached.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery(MISSING_QUERY.to_string()));
        }

        if let Some(results) = self.cache.get(query).await {
            info!("Cache hit for {:?} ({} results)", query, results.len());
            return Ok(SearchOutcome {
                results,
                warnings: Vec::new(),
                cached: true,
            });
        }

        let start = Instant::now();
        let per_engine = match self.config.fan_out {
            FanOut::Sequential => self.search_sequential(query).await?,
            FanOut::Concurrent => {
                join_all(
                    self.targets
                        .iter()
                        .map(|target| async move { (target, self.search_engine(target, query).await) }),
                )
                .await
            }
        };

        let mut engine_results = Vec::with_capacity(per_engine.len());
        let mut warnings = Vec::new();
        for (target, outcome) in per_engine {
            match outcome {
                Ok(results) => engine_results.push((target.name.clone(), results)),
                Err(e) => match self.config.failure_mode {
                    FailureMode::Abort => return Err(SearchError::engine(&target.name, e)),
                    FailureMode::Isolate => {
                        warn!("Engine {} failed: {}", target.name, e);
                        warnings.push(EngineWarning {
                            engine: target.name.clone(),
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        let results = merge_results(engine_results, self.config.result_cap);
        debug!(
            "Aggregated {} results for {:?} in {}ms",
            results.len(),
            query,
            start.elapsed().as_millis()
        );

        if warnings.is_empty() {
            self.cache.set(query, results.clone()).await;
            info!("Cached {} results for {:?}", results.len(), query);
        } else {
            debug!("Not caching partial results for {:?}", query);
        }

        Ok(SearchOutcome {
            results,
            warnings,
            cached: false,
        })
    }

    /// Runs each target in order. Under [`FailureMode::Abort`] the first
    /// failure stops the loop before later engines are fetched.
    async fn search_sequential<'a>(
        &'a self,
        query: &str,
    ) -> Result<Vec<(&'a EngineTarget, Result<Vec<SearchResult>>)>> {
        let mut per_engine = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            match self.search_engine(target, query).await {
                Err(e) if self.config.failure_mode == FailureMode::Abort => {
                    warn!("Engine {} failed, aborting search: {}", target.name, e);
                    return Err(SearchError::engine(&target.name, e));
                }
                outcome => per_engine.push((target, outcome)),
            }
        }
        Ok(per_engine)
    }

    async fn search_engine(&self, target: &EngineTarget, query: &str) -> Result<Vec<SearchResult>> {
        let url = target.url(query);
        let html = self.fetcher.fetch(&url).await?;
        let results = self.parsers.parse(&target.name, &html);
        debug!("Engine {} returned {} results", target.name, results.len());
        Ok(results)
    }
}
