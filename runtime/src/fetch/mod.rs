//! Page acquisition: static HTTP fetches and scoped rendered sessions.
//!
//! Extractors only see the [`Fetcher`] trait. The live implementation talks
//! to the network and launches Chromium; [`fixture::FixtureFetcher`] serves
//! canned HTML.

pub mod fixture;
pub mod http_client;

use crate::config::FetchConfig;
use crate::error::{ExtractionError, FetchError};
use crate::renderer::chromium::ChromiumSession;
use crate::renderer::RenderSession;
use async_trait::async_trait;
use futures::future::BoxFuture;
use http_client::HttpClient;
use tracing::warn;

/// Source of page HTML for the extractors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the server-rendered HTML of `url`.
    async fn fetch_static(&self, url: &str) -> Result<String, FetchError>;

    /// Start a browser for script-rendered pages.
    ///
    /// Callers should go through [`with_rendered_session`] so the browser is
    /// always shut down.
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, FetchError>;
}

/// Run `work` inside a freshly opened render session.
///
/// The session is closed after `work` finishes, whether it succeeded or
/// failed. A close failure is logged and does not mask the work's outcome.
pub async fn with_rendered_session<T, F>(
    fetcher: &dyn Fetcher,
    work: F,
) -> Result<T, ExtractionError>
where
    F: for<'s> FnOnce(&'s mut dyn RenderSession) -> BoxFuture<'s, Result<T, ExtractionError>>,
{
    let mut session = fetcher.open_session().await?;
    let outcome = work(session.as_mut()).await;
    if let Err(e) = session.close().await {
        warn!(error = %e, "failed to close render session");
    }
    outcome
}

/// Network-backed fetcher: reqwest for static pages, Chromium for rendered ones.
pub struct LiveFetcher {
    http: HttpClient,
    config: FetchConfig,
}

impl LiveFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            http: HttpClient::new(&config),
            config,
        }
    }
}

#[async_trait]
impl Fetcher for LiveFetcher {
    async fn fetch_static(&self, url: &str) -> Result<String, FetchError> {
        self.http.get(url).await
    }

    async fn open_session(&self) -> Result<Box<dyn RenderSession>, FetchError> {
        let session = ChromiumSession::launch(&self.config).await?;
        Ok(Box::new(session))
    }
}

#[cfg(test)]
mod tests {
    use super::fixture::FixtureFetcher;
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_session_closed_after_success() {
        let fetcher = FixtureFetcher::new().with_rendered("https://a.test/", "<p>a</p>");
        let html = with_rendered_session(&fetcher, |session| {
            Box::pin(async move {
                Ok::<_, ExtractionError>(session.render("https://a.test/", Duration::ZERO).await?)
            })
        })
        .await
        .expect("render should succeed");

        assert_eq!(html, "<p>a</p>");
        assert_eq!(fetcher.sessions_opened(), 1);
        assert_eq!(fetcher.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_session_closed_after_failure() {
        let fetcher = FixtureFetcher::new();
        let result = with_rendered_session(&fetcher, |session| {
            Box::pin(async move {
                Ok::<_, ExtractionError>(session.render("https://missing.test/", Duration::ZERO).await?)
            })
        })
        .await;

        assert!(matches!(result, Err(ExtractionError::Fetch(FetchError::NotFound(_)))));
        assert_eq!(fetcher.sessions_opened(), 1);
        assert_eq!(fetcher.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_open_failure_skips_work() {
        let fetcher = FixtureFetcher::new().without_browser();
        let result: Result<(), _> = with_rendered_session(&fetcher, |_session| {
            Box::pin(async move {
                Err::<(), _>(ExtractionError::Parse("work ran without a session".to_string()))
            })
        })
        .await;

        assert!(matches!(result, Err(ExtractionError::Fetch(FetchError::Browser(_)))));
        assert_eq!(fetcher.sessions_opened(), 0);
        assert_eq!(fetcher.sessions_closed(), 0);
    }
}
