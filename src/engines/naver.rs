//! Naver result page parser.

use crate::engines::{CompiledSelectors, ResultParser, SelectorSet};
use crate::{Result, SearchResult};

/// Parser for Naver's integrated search page.
///
/// The first anchor in each block supplies both the title and the link.
pub struct NaverParser {
    selectors: CompiledSelectors,
}

impl NaverParser {
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

    /// Selectors for the `div.total_wrap` integrated search block.
    pub fn default_selectors() -> SelectorSet {
        SelectorSet {
            version: "2024.1".to_string(),
            container: "div.total_wrap".to_string(),
            title: "a".to_string(),
            link: "a".to_string(),
            snippet: "div.total_group".to_string(),
        }
    }
}

impl ResultParser for NaverParser {
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
