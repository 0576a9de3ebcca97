//! Chromium-based render session using chromiumoxide.

use super::RenderSession;
use crate::config::FetchConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// Find the Chromium binary path.
///
/// An explicit path from configuration wins; otherwise the system `PATH`,
/// then the usual macOS install location.
pub fn find_chromium(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.clone());
        }
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// One headless Chromium process with a single reusable tab.
///
/// Dropping a session without calling [`RenderSession::close`] still kills
/// the browser: chromiumoxide spawns the child with kill-on-drop.
pub struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<Page>,
    render_timeout: Duration,
}

impl ChromiumSession {
    /// Launch a headless Chromium instance.
    pub async fn launch(config: &FetchConfig) -> Result<Self, FetchError> {
        let chrome_path = find_chromium(config.chromium_path.as_ref()).ok_or_else(|| {
            FetchError::Browser("Chromium not found; set JAPA_CHROMIUM_PATH".to_string())
        })?;

        let browser_config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg(format!("--user-agent={}", config.user_agent))
            .build()
            .map_err(|e| FetchError::Browser(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| FetchError::Browser(format!("failed to launch Chromium: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        debug!("launched Chromium session");

        Ok(Self {
            browser,
            handler,
            page: None,
            render_timeout: config.render_timeout,
        })
    }

    async fn page(&mut self) -> Result<Page, FetchError> {
        if let Some(page) = &self.page {
            return Ok(page.clone());
        }
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(format!("failed to create new page: {e}")))?;
        self.page = Some(page.clone());
        Ok(page)
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn render(&mut self, url: &str, settle: Duration) -> Result<String, FetchError> {
        let page = self.page().await?;
        let start = Instant::now();

        let navigation = tokio::time::timeout(self.render_timeout, async {
            page.goto(url).await.map_err(|e| e.to_string())?;
            page.wait_for_navigation().await.map_err(|e| e.to_string())?;
            Ok::<(), String>(())
        })
        .await;

        match navigation {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(FetchError::Browser(format!("navigation to {url} failed: {e}")));
            }
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    after: self.render_timeout,
                });
            }
        }

        tokio::time::sleep(settle).await;

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::Browser(format!("failed to read page content: {e}")))?;

        debug!(
            url,
            elapsed_ms = start.elapsed().as_millis() as u64,
            bytes = html.len(),
            "rendered page"
        );
        Ok(html)
    }

    async fn close(mut self: Box<Self>) -> Result<(), FetchError> {
        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| FetchError::Browser(format!("failed to close Chromium: {e}")));
        let _ = self.browser.wait().await;
        self.handler.abort();
        debug!("closed Chromium session");
        closed
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
