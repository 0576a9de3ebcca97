//! Async HTTP client wrapping reqwest.
//!
//! Used for sources that render server-side and need no browser.
//! Follows a bounded number of redirects and treats any non-2xx status as
//! a failure. Requests are never retried.

use crate::config::FetchConfig;
use crate::error::FetchError;
use std::time::Duration;
use tracing::debug;

/// HTTP client for static page fetches.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &FetchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap_or_default();

        Self {
            client,
            timeout: config.http_timeout,
        }
    }

    /// Perform a single GET request and return the response body.
    pub async fn get(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e, self.timeout))?;

        let status = resp.status().as_u16();
        if resp.url().as_str() != url {
            debug!(url, final_url = %resp.url(), "followed redirect");
        }

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e, self.timeout))?;

        debug!(url, status, bytes = body.len(), "fetched page");
        Ok(body)
    }
}
