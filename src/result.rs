//! Search result types.

use serde::{Deserialize, Serialize};

/// Maximum snippet length in characters before truncation.
pub const SNIPPET_MAX_CHARS: usize = 300;

/// Marker appended to truncated snippets.
pub const ELLIPSIS: &str = "...";

/// A single normalized search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title.
    pub title: String,
    /// Destination URL.
    pub url: String,
    /// Result summary, possibly truncated.
    #[serde(default)]
    pub snippet: String,
    /// Site name of the engine that produced the result.
    ///
    /// Empty until the aggregator tags the result.
    #[serde(default)]
    pub site: String,
}

impl SearchResult {
    /// Creates an untagged search result.
    pub fn new(url: impl Into<String>, title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            site: String::new(),
        }
    }

    /// Tags the result with the site that produced it.
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = site.into();
        self
    }
}

/// Truncates `text` to `max` characters, appending [`ELLIPSIS`] when cut.
pub fn truncate_snippet(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}
