//! In-memory fetcher serving canned HTML by URL.
//!
//! Keeps count of opened and closed render sessions so callers can check
//! that every browser started was also shut down.

use super::Fetcher;
use crate::error::FetchError;
use crate::renderer::RenderSession;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a page was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Static,
    Rendered,
}

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Fetcher backed by a fixed URL → HTML table.
#[derive(Clone, Default)]
pub struct FixtureFetcher {
    static_pages: HashMap<String, String>,
    rendered_pages: HashMap<String, String>,
    browser_missing: bool,
    counters: Arc<Counters>,
    requests: Arc<Mutex<Vec<(FetchMode, String)>>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for static fetches of `url`.
    pub fn with_static(mut self, url: &str, html: &str) -> Self {
        self.static_pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Serve `html` for rendered fetches of `url`.
    pub fn with_rendered(mut self, url: &str, html: &str) -> Self {
        self.rendered_pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Make every attempt to open a render session fail.
    pub fn without_browser(mut self) -> Self {
        self.browser_missing = true;
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<(FetchMode, String)> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn record(&self, mode: FetchMode, url: &str) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((mode, url.to_string()));
        }
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch_static(&self, url: &str) -> Result<String, FetchError> {
        self.record(FetchMode::Static, url);
        self.static_pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }

    async fn open_session(&self) -> Result<Box<dyn RenderSession>, FetchError> {
        if self.browser_missing {
            return Err(FetchError::Browser("Chromium not found".to_string()));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixtureSession {
            fetcher: self.clone(),
        }))
    }
}

struct FixtureSession {
    fetcher: FixtureFetcher,
}

#[async_trait]
impl RenderSession for FixtureSession {
    async fn render(&mut self, url: &str, _settle: Duration) -> Result<String, FetchError> {
        self.fetcher.record(FetchMode::Rendered, url);
        self.fetcher
            .rendered_pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), FetchError> {
        self.fetcher.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_and_rendered_pages_are_separate() {
        let fetcher = FixtureFetcher::new()
            .with_static("https://a.test/", "static")
            .with_rendered("https://b.test/", "rendered");

        assert_eq!(fetcher.fetch_static("https://a.test/").await.unwrap(), "static");
        assert!(matches!(
            fetcher.fetch_static("https://b.test/").await,
            Err(FetchError::NotFound(_))
        ));

        let mut session = fetcher.open_session().await.unwrap();
        assert_eq!(
            session.render("https://b.test/", Duration::ZERO).await.unwrap(),
            "rendered"
        );
        session.close().await.unwrap();

        assert_eq!(
            fetcher.requests(),
            vec![
                (FetchMode::Static, "https://a.test/".to_string()),
                (FetchMode::Static, "https://b.test/".to_string()),
                (FetchMode::Rendered, "https://b.test/".to_string()),
            ]
        );
    }
}
