//! Rendered page acquisition for script-heavy sources.
//!
//! Defines the `RenderSession` trait that abstracts over the browser engine
//! (currently Chromium via chromiumoxide). A session owns exactly one browser
//! process and must be closed by the code that opened it; see
//! [`crate::fetch::with_rendered_session`].

pub mod chromium;

use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// A live browser process that can render pages one after another.
#[async_trait]
pub trait RenderSession: Send {
    /// Navigate to `url`, wait `settle`, then return the page HTML.
    ///
    /// The settle delay is a fixed wait; there is no readiness detection.
    async fn render(&mut self, url: &str, settle: Duration) -> Result<String, FetchError>;

    /// Terminate the browser process.
    async fn close(self: Box<Self>) -> Result<(), FetchError>;
}
