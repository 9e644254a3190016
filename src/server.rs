//! HTTP server exposing the aggregator.
//!
//! - `GET /search?q=<query>`: JSON array of at most `result_cap` results
//! - `GET /health`: liveness check with the current time

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::{Aggregator, SearchError};

/// Error message returned for any failure other than a bad query.
pub const SEARCH_FAILED: &str = "Failed to perform search";

/// Response header listing engines that failed during a partial aggregation.
pub static WARNINGS_HEADER: HeaderName = HeaderName::from_static("x-search-warnings");

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

/// Returns the `q` parameter of a query string.
///
/// Repeated `q` parameters are joined with commas instead of being rejected.
fn query_param(params: &[(String, String)]) -> String {
    params
        .iter()
        .filter(|(key, _)| key == "q")
        .map(|(_, value)| value.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub time: String,
}

/// Maps aggregation errors onto HTTP responses.
pub struct ApiError(SearchError);

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_client_error() {
            debug!("Rejected search request: {}", self.0);
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(self.0.to_string())))
                .into_response();
        }
        error!("Search error: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(SEARCH_FAILED)),
        )
            .into_response()
    }
}

/// Search endpoint.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let query = query_param(&params);
    let outcome = state.aggregator.search(&query).await?;

    let failed: Vec<&str> = outcome.warnings.iter().map(|w| w.engine.as_str()).collect();
    let mut response = Json(outcome.results).into_response();
    if !failed.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&failed.join(",")) {
            response.headers_mut().insert(WARNINGS_HEADER.clone(), value);
        }
    }
    Ok(response)
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server and run until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Search API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::aggregator::{AggregatorConfig, FailureMode, ResultCache};
    use crate::engines::ParserRegistry;
    use crate::test_utils::{Reply, ScriptedFetcher};
    use crate::EngineKind;

    fn app(fetcher: Arc<ScriptedFetcher>, config: AggregatorConfig) -> Router {
        let aggregator = Aggregator::new(
            fetcher,
            ParserRegistry::with_defaults().unwrap(),
            Arc::new(ResultCache::default()),
        )
        .with_config(config);
        create_router(AppState::new(aggregator))
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = app(Arc::new(ScriptedFetcher::new()), AggregatorConfig::default());
        let (status, _, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        let time = body["time"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
        assert!(time.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_search_missing_or_blank_query_is_400() {
        let fetcher = Arc::new(ScriptedFetcher::with_counts(1, 1, 1));
        let app = app(fetcher.clone(), AggregatorConfig::default());

        for uri in ["/search", "/search?q=", "/search?q=%20%20%20", "/search?other=1"] {
            let (status, _, body) = get(&app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body, json!({ "error": "Missing q query parameter" }));
        }
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_search_returns_capped_tagged_array() {
        let fetcher = Arc::new(ScriptedFetcher::with_counts(4, 3, 5));
        let app = app(fetcher.clone(), AggregatorConfig::default());

        let (status, headers, body) = get(&app, "/search?q=kyoto").await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers.get(&WARNINGS_HEADER).is_none());
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 10);
        assert_eq!(items[0]["site"], "google.com");
        assert_eq!(items[0]["title"], "Google result 0");
        assert_eq!(items[0]["url"], "https://google.example/0");
        assert_eq!(items[0]["snippet"], "Google snippet 0");
        assert_eq!(items[9]["site"], "bing.com");

        let (_, _, again) = get(&app, "/search?q=kyoto").await;
        assert_eq!(again, body);
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test]
    async fn test_search_engine_failure_is_500() {
        let fetcher = Arc::new(
            ScriptedFetcher::with_counts(4, 3, 5).reply(EngineKind::Google, Reply::Fail),
        );
        let app = app(fetcher, AggregatorConfig::default());

        let (status, _, body) = get(&app, "/search?q=kyoto").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to perform search" }));
    }

    #[tokio::test]
    async fn test_search_isolated_failure_sets_warning_header() {
        let fetcher = Arc::new(
            ScriptedFetcher::with_counts(4, 3, 5).reply(EngineKind::Google, Reply::Fail),
        );
        let config = AggregatorConfig {
            failure_mode: FailureMode::Isolate,
            ..Default::default()
        };
        let app = app(fetcher, config);

        let (status, headers, body) = get(&app, "/search?q=kyoto").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get(&WARNINGS_HEADER).unwrap(), "google.com");
        assert_eq!(body.as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_search_repeated_q_is_joined() {
        let fetcher = Arc::new(ScriptedFetcher::with_counts(1, 1, 1));
        let app = app(fetcher.clone(), AggregatorConfig::default());

        let (status, headers, body) = get(&app, "/search?q=kyoto&q=osaka").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(
            fetcher.calls()[2],
            "https://www.bing.com/search?q=kyoto%2Cosaka"
        );
    }

    #[test]
    fn test_query_param() {
        let pairs = |raw: &[(&str, &str)]| -> Vec<(String, String)> {
            raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };
        assert_eq!(query_param(&pairs(&[])), "");
        assert_eq!(query_param(&pairs(&[("other", "1")])), "");
        assert_eq!(query_param(&pairs(&[("q", "kyoto")])), "kyoto");
        assert_eq!(
            query_param(&pairs(&[("q", "kyoto"), ("page", "2"), ("q", "osaka")])),
            "kyoto,osaka"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = app(Arc::new(ScriptedFetcher::new()), AggregatorConfig::default());
        let (status, _, _) = get(&app, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
