//! Error taxonomy for fetching, extraction, dispatch and roadmap generation.

use std::time::Duration;

/// A page could not be fetched.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("timed out after {}ms fetching {url}", .after.as_millis())]
    Timeout { url: String, after: Duration },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("no page available for {0}")]
    NotFound(String),
}

impl FetchError {
    /// Classify a reqwest error for the given URL.
    pub fn from_reqwest(url: &str, err: reqwest::Error, after: Duration) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                url: url.to_string(),
                after,
            };
        }
        if let Some(status) = err.status() {
            return Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            };
        }
        Self::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Live extraction did not produce a usable result.
///
/// Never surfaced to API callers: the requirements pipeline converts every
/// variant into the country's fallback payload.
#[derive(thiserror::Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("only {found} documents extracted, need at least {required}")]
    Sparse { found: usize, required: usize },
}

/// Errors visible to callers of the requirements dispatcher.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RequirementsError {
    #[error("Scraper not available for '{0}' yet.")]
    UnsupportedCountry(String),
}

/// Roadmap generation failed.
#[derive(thiserror::Error, Debug)]
pub enum RoadmapError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("request to model endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model endpoint returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned no content")]
    EmptyResponse,

    /// The model answered, but not with the expected JSON object.
    #[error("Failed to parse GPT response")]
    ModelOutput { raw: String },
}
