//! Shared test utilities: result page fixtures and a scripted fetcher.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::fetcher::PageFetcher;
use crate::{EngineKind, Result, SearchError};

/// Builds a Google result page with `count` well-formed results.
pub fn google_page(count: usize) -> String {
    let items: String = (0..count)
        .map(|i| {
            format!(
                r#"<div class="g"><a href="https://google.example/{i}"><h3>Google result {i}</h3></a><div class="VwiC3b">Google snippet {i}</div></div>"#
            )
        })
        .collect();
    format!("<html><body><div id=\"search\">{items}</div></body></html>")
}

/// Builds a Naver result page with `count` well-formed results.
pub fn naver_page(count: usize) -> String {
    let items: String = (0..count)
        .map(|i| {
            format!(
                r#"<div class="total_wrap"><a href="https://naver.example/{i}">Naver result {i}</a><div class="total_group">Naver snippet {i}</div></div>"#
            )
        })
        .collect();
    format!("<html><body>{items}</body></html>")
}

/// Builds a Bing result page with `count` well-formed results.
pub fn bing_page(count: usize) -> String {
    let items: String = (0..count)
        .map(|i| {
            format!(
                r#"<li class="b_algo"><h2><a href="https://bing.example/{i}">Bing result {i}</a></h2><p>Bing snippet {i}</p></li>"#
            )
        })
        .collect();
    format!("<html><body><ol id=\"b_results\">{items}</ol></body></html>")
}

/// What the scripted fetcher does for one engine.
#[derive(Debug, Clone)]
pub enum Reply {
    Page(String),
    Delayed(Duration, String),
    Fail,
}

/// A [`PageFetcher`] that answers by engine host and records every call.
#[derive(Default)]
pub struct ScriptedFetcher {
    replies: HashMap<EngineKind, Reply>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reply for requests to `engine`'s host.
    pub fn reply(mut self, engine: EngineKind, reply: Reply) -> Self {
        self.replies.insert(engine, reply);
        self
    }

    /// Replies to each engine with the given number of results.
    pub fn with_counts(google: usize, naver: usize, bing: usize) -> Self {
        Self::new()
            .reply(EngineKind::Google, Reply::Page(google_page(google)))
            .reply(EngineKind::Naver, Reply::Page(naver_page(naver)))
            .reply(EngineKind::Bing, Reply::Page(bing_page(bing)))
    }

    /// URLs fetched so far, in request order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Total number of fetches performed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of fetches sent to `engine`'s host.
    pub fn calls_to(&self, engine: EngineKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(engine.site()))
            .count()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());

        let reply = EngineKind::ALL
            .iter()
            .find(|kind| url.contains(kind.site()))
            .and_then(|kind| self.replies.get(kind))
            .cloned();

        match reply {
            Some(Reply::Page(html)) => Ok(html),
            Some(Reply::Delayed(delay, html)) => {
                tokio::time::sleep(delay).await;
                Ok(html)
            }
            Some(Reply::Fail) => Err(SearchError::Other(format!("connection reset: {}", url))),
            None => Ok(String::new()),
        }
    }
}
