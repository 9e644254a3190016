//! Google result page parser.

use crate::engines::{CompiledSelectors, ResultParser, SelectorSet};
use crate::{Result, SearchResult};

/// Parser for Google's server-rendered result page.
pub struct GoogleParser {
    selectors: CompiledSelectors,
}

impl GoogleParser {
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

    /// Selectors for the classic `div.g` result block.
    pub fn default_selectors() -> SelectorSet {
        SelectorSet {
            version: "2024.1".to_string(),
            container: "div.g".to_string(),
            title: "h3".to_string(),
            link: "a[href]".to_string(),
            snippet: "div.VwiC3b, span.aCOpRe, div[data-sncf]".to_string(),
        }
    }
}

/// Resolves a result anchor's `href` to the destination URL.
///
/// `/url?q=<target>&...` redirects are unwrapped; any other site-relative
/// link points back into Google and is discarded.
fn resolve_href(href: &str) -> Option<String> {
    if let Some(query) = href.strip_prefix("/url?") {
        return url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned());
    }
    if href.starts_with('/') {
        return None;
    }
    Some(href.to_string())
}

impl ResultParser for GoogleParser {
    fn selectors(&self) -> &SelectorSet {
        self.selectors.set()
    }

    fn parse(&self, html: &str) -> Vec<SearchResult> {
        self.selectors
            .extract(html)
            .into_iter()
            .filter_map(|raw| raw.into_result(resolve_href))
            .collect()
    }
}
