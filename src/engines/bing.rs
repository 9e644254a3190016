//! Bing result page parser.

use crate::engines::{CompiledSelectors, ResultParser, SelectorSet};
use crate::{Result, SearchResult};

/// Parser for Bing's `li.b_algo` result list.
pub struct BingParser {
    selectors: CompiledSelectors,
}

impl BingParser {
    /// Creates a parser with the current selector set.
    pub fn new() -> Result<Self> {
        Self::with_selectors(Self::default_selectors())
    }

    /// Creates a parser with custom selectors.
    pub fn with_selectors(set: SelectorSet) -> Result<Self> {
        Ok(Self {
            selectors: CompiledSelectors::compile(set)?,
        })
    }

    /// Selectors for the `li.b_algo` result list.
    pub fn default_selectors() -> SelectorSet {
        SelectorSet {
            version: "2024.1".to_string(),
            container: "li.b_algo".to_string(),
            title: "h2".to_string(),
            link: "h2 a".to_string(),
            snippet: "p".to_string(),
        }
    }
}

impl ResultParser for BingParser {
    fn selectors(&self) -> &SelectorSet {
        self.selectors.set()
    }

    fn parse(&self, html: &str) -> Vec<SearchResult> {
        self.selectors
            .extract(html)
            .into_iter()
            .filter_map(|raw| raw.into_result(|href| Some(href.to_string())))
            .collect()
    }
}
