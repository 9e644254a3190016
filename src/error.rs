//! Error types for the search aggregator.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// HTTP request failed after all retry attempts.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A parser could not be built from its selector set.
    #[error("Failed to parse selector: {0}")]
    Parse(String),

    /// The query was missing or blank.
    #[error("{0}")]
    InvalidQuery(String),

    /// A URL was requested for an engine that is not registered.
    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    /// One engine's fetch or parse step failed during aggregation.
    #[error("Engine '{engine}' failed: {source}")]
    Engine {
        engine: String,
        #[source]
        source: Box<SearchError>,
    },

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl SearchError {
    /// Wraps an error with the name of the engine that produced it.
    pub fn engine(engine: impl Into<String>, source: SearchError) -> Self {
        Self::Engine {
            engine: engine.into(),
            source: Box::new(source),
        }
    }

    /// Returns true for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidQuery(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse() {
        let err = SearchError::Parse("div..g".to_string());
        assert_eq!(err.to_string(), "Failed to parse selector: div..g");
    }

    #[test]
    fn test_error_display_invalid_query() {
        let err = SearchError::InvalidQuery("Missing q query parameter".to_string());
        assert_eq!(err.to_string(), "Missing q query parameter");
    }

    #[test]
    fn test_error_display_unknown_engine() {
        let err = SearchError::UnknownEngine("yahoo".to_string());
        assert_eq!(err.to_string(), "Unknown engine: yahoo");
    }

    #[test]
    fn test_error_display_engine_wraps_source() {
        let err = SearchError::engine("bing.com", SearchError::Other("reset".to_string()));
        assert_eq!(err.to_string(), "Engine 'bing.com' failed: reset");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "reset");
    }

    #[test]
    fn test_error_display_other() {
        let err = SearchError::Other("something went wrong".to_string());
        assert_eq!(err.to_string(), "something went wrong");
    }

    #[test]
    fn test_is_client_error() {
        assert!(SearchError::InvalidQuery("x".into()).is_client_error());
        assert!(!SearchError::UnknownEngine("x".into()).is_client_error());
        assert!(!SearchError::engine("google.com", SearchError::Other("x".into())).is_client_error());
    }
}
