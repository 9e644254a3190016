//! Engine identifiers, search URL templates and aggregation targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, SearchError};

/// Search engines the aggregator knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Google,
    Naver,
    Bing,
}

impl EngineKind {
    /// All known engines, in declaration order.
    pub const ALL: [EngineKind; 3] = [EngineKind::Google, EngineKind::Naver, EngineKind::Bing];

    /// Returns the engine identifier used by [`build_search_url`].
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Google => "google",
            EngineKind::Naver => "naver",
            EngineKind::Bing => "bing",
        }
    }

    /// Returns the site name results from this engine are tagged with.
    pub fn site(&self) -> &'static str {
        match self {
            EngineKind::Google => "google.com",
            EngineKind::Naver => "naver.com",
            EngineKind::Bing => "bing.com",
        }
    }

    /// Returns the search URL with a `{query}` placeholder.
    pub fn url_template(&self) -> &'static str {
        match self {
            EngineKind::Google => "https://www.google.com/search?q={query}&hl=ko",
            EngineKind::Naver => "https://search.naver.com/search.naver?query={query}",
            EngineKind::Bing => "https://www.bing.com/search?q={query}",
        }
    }

    /// Builds the engine's search URL with the query percent-encoded.
    pub fn search_url(&self, query: &str) -> String {
        self.url_template()
            .replace("{query}", &urlencoding::encode(query))
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "google" => Ok(EngineKind::Google),
            "naver" => Ok(EngineKind::Naver),
            "bing" => Ok(EngineKind::Bing),
            other => Err(SearchError::UnknownEngine(other.to_string())),
        }
    }
}

/// Maps an engine identifier and free-text query to the engine's search URL.
///
/// Fails with [`SearchError::UnknownEngine`] for identifiers outside the
/// known set; there is no fallback engine.
pub fn build_search_url(engine: &str, query: &str) -> Result<String> {
    Ok(engine.parse::<EngineKind>()?.search_url(query))
}

/// One engine the aggregator queries, and the site name its results carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineTarget {
    /// Site name used to tag results and to select a parser.
    pub name: String,
    /// Engine whose URL template is used.
    pub engine: EngineKind,
}

impl EngineTarget {
    /// Creates a target from an engine identifier.
    pub fn new(name: impl Into<String>, engine: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            engine: engine.parse()?,
        })
    }

    /// Creates the target for an engine, named after its site.
    pub fn for_engine(engine: EngineKind) -> Self {
        Self {
            name: engine.site().to_string(),
            engine,
        }
    }

    /// Returns the search URL for this target.
    pub fn url(&self, query: &str) -> String {
        self.engine.search_url(query)
    }
}

/// The predefined targets, in the order their results are merged.
pub fn default_targets() -> Vec<EngineTarget> {
    EngineKind::ALL
        .iter()
        .copied()
        .map(EngineTarget::for_engine)
        .collect()
}
