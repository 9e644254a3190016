//! Result page parsers, one per engine, and the registry that selects them.
//!
//! Each parser is driven by a [`SelectorSet`]: plain data naming the CSS
//! selectors for the repeating result container and the title, link and
//! snippet inside it. Markup changes are handled by shipping a new selector
//! set version rather than editing traversal code.

mod bing;
mod google;
mod naver;

use std::collections::HashMap;
use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::result::{truncate_snippet, SNIPPET_MAX_CHARS};
use crate::{EngineKind, Result, SearchError, SearchResult};

pub use bing::BingParser;
pub use google::GoogleParser;
pub use naver::NaverParser;

/// CSS selectors describing one engine's result markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    /// Identifies the markup revision these selectors target.
    pub version: String,
    /// Repeating element wrapping a single result.
    pub container: String,
    /// Element whose text is the title, searched inside the container.
    pub title: String,
    /// Anchor whose `href` is the destination, searched inside the container.
    pub link: String,
    /// Element whose text is the snippet, searched inside the container.
    pub snippet: String,
}

/// A [`SelectorSet`] compiled into `scraper` selectors.
#[derive(Debug)]
pub struct CompiledSelectors {
    set: SelectorSet,
    container: Selector,
    title: Selector,
    link: Selector,
    snippet: Selector,
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("{}: {:?}", css, e)))
}

impl CompiledSelectors {
    /// Compiles every selector in the set.
    pub fn compile(set: SelectorSet) -> Result<Self> {
        Ok(Self {
            container: compile(&set.container)?,
            title: compile(&set.title)?,
            link: compile(&set.link)?,
            snippet: compile(&set.snippet)?,
            set,
        })
    }

    /// Returns the source selector set.
    pub fn set(&self) -> &SelectorSet {
        &self.set
    }

    /// Extracts one record per container, with the raw `href` left for the
    /// caller to resolve.
    ///
    /// Only the first title and link match in a container are considered, so
    /// when both selectors are equal they name the same element. Containers
    /// without a title element or a link `href` are yielded with empty fields
    /// so the caller's emptiness check drops them.
    fn extract(&self, html: &str) -> Vec<RawResult> {
        let document = Html::parse_document(html);
        document
            .select(&self.container)
            .map(|container| RawResult {
                title: first_text(container, &self.title),
                href: container
                    .select(&self.link)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                snippet: first_text(container, &self.snippet),
            })
            .collect()
    }
}

fn first_text(container: ElementRef<'_>, selector: &Selector) -> String {
    container
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// One container's fields before validation.
#[derive(Debug, Clone)]
struct RawResult {
    title: String,
    href: String,
    snippet: String,
}

impl RawResult {
    /// Builds a result, resolving the raw `href` to its destination.
    ///
    /// Returns `None` when the title or the resolved URL is empty.
    fn into_result(self, resolve: impl FnOnce(&str) -> Option<String>) -> Option<SearchResult> {
        let url = resolve(&self.href)?;
        if self.title.is_empty() || url.is_empty() {
            return None;
        }
        Some(SearchResult::new(
            url,
            self.title,
            truncate_snippet(&self.snippet, SNIPPET_MAX_CHARS),
        ))
    }
}

/// Parses one engine's result page into untagged results.
///
/// Parsing never fails: malformed or empty markup yields an empty list.
pub trait ResultParser: Send + Sync {
    /// Returns the selectors this parser applies.
    fn selectors(&self) -> &SelectorSet;

    /// Extracts results from raw HTML.
    fn parse(&self, html: &str) -> Vec<SearchResult>;
}

/// Maps site names to their parsing strategy.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn ResultParser>>,
}

impl ParserRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in parser for every known engine,
    /// keyed by the engine's site name.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        for kind in EngineKind::ALL {
            registry.register(kind.site(), default_parser(kind)?);
        }
        Ok(registry)
    }

    /// Registers (or replaces) the parser for a site.
    pub fn register(&mut self, site: impl Into<String>, parser: Arc<dyn ResultParser>) {
        self.parsers.insert(site.into(), parser);
    }

    /// Returns whether a parser is registered for the site.
    pub fn contains(&self, site: &str) -> bool {
        self.parsers.contains_key(site)
    }

    /// Returns the parser registered for the site.
    pub fn get(&self, site: &str) -> Option<&Arc<dyn ResultParser>> {
        self.parsers.get(site)
    }

    /// Parses `html` with the site's parser.
    ///
    /// Unregistered sites yield no results rather than an error.
    pub fn parse(&self, site: &str, html: &str) -> Vec<SearchResult> {
        match self.parsers.get(site) {
            Some(parser) => parser.parse(html),
            None => {
                debug!("No parser registered for {}", site);
                Vec::new()
            }
        }
    }
}

/// Builds the default parser for an engine.
pub fn default_parser(kind: EngineKind) -> Result<Arc<dyn ResultParser>> {
    Ok(match kind {
        EngineKind::Google => Arc::new(GoogleParser::new()?),
        EngineKind::Naver => Arc::new(NaverParser::new()?),
        EngineKind::Bing => Arc::new(BingParser::new()?),
    })
}
