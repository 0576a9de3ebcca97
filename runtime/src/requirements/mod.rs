//! Study-visa document requirements per destination country.
//!
//! Each supported country has an [`Extractor`] that fetches a small fixed
//! set of official pages, pulls requirement text out of them and normalizes
//! it into a document checklist. Live extraction is best effort: whenever it
//! fails, [`collect`] substitutes the country's curated fallback payload, so
//! callers always receive a well-formed [`RequirementsResult`].

pub mod canada;
pub mod dispatch;
pub mod fallback;
pub mod germany;
pub mod html;
pub mod normalize;
pub mod uk;
pub mod usa;

use crate::config::FetchConfig;
use crate::error::ExtractionError;
use crate::fetch::Fetcher;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// A supported destination country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountryCode {
    Canada,
    Uk,
    Usa,
    Germany,
}

impl CountryCode {
    pub const ALL: [CountryCode; 4] = [
        CountryCode::Canada,
        CountryCode::Uk,
        CountryCode::Usa,
        CountryCode::Germany,
    ];

    /// Canonical name reported in results, independent of the alias used.
    pub fn name(self) -> &'static str {
        match self {
            CountryCode::Canada => "Canada",
            CountryCode::Uk => "UK",
            CountryCode::Usa => "USA",
            CountryCode::Germany => "Germany",
        }
    }

    /// Maximum number of documents in a result.
    pub fn document_cap(self) -> usize {
        match self {
            CountryCode::Canada => 6,
            CountryCode::Uk | CountryCode::Usa | CountryCode::Germany => 12,
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Study-visa requirements for one country.
///
/// Optional fields are only set by the countries whose sources provide them
/// and are omitted from the JSON form when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementsResult {
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visa_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visa_types: Option<Vec<String>>,
    pub documents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<String>,
    pub language_requirements: String,
    pub timeline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_notes: Option<Vec<String>>,
    pub official_links: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_fallback: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl RequirementsResult {
    /// A result with only the mandatory fields set.
    pub fn new(
        country: CountryCode,
        documents: Vec<String>,
        language_requirements: &str,
        timeline: &str,
        official_links: &[&str],
    ) -> Self {
        Self {
            country: country.name().to_string(),
            visa_type: None,
            visa_types: None,
            documents,
            fees: None,
            language_requirements: language_requirements.to_string(),
            timeline: timeline.to_string(),
            special_notes: None,
            official_links: official_links.iter().map(|l| l.to_string()).collect(),
            used_fallback: None,
            last_updated: None,
        }
    }

    pub fn with_visa_type(mut self, visa_type: &str) -> Self {
        self.visa_type = Some(visa_type.to_string());
        self
    }

    pub fn with_visa_types(mut self, visa_types: Vec<String>) -> Self {
        self.visa_types = Some(visa_types);
        self
    }

    pub fn with_fees(mut self, fees: &str) -> Self {
        self.fees = Some(fees.to_string());
        self
    }

    pub fn with_special_notes(mut self, notes: &[&str]) -> Self {
        self.special_notes = Some(notes.iter().map(|n| n.to_string()).collect());
        self
    }
}

/// Settle delays handed to extractors that render pages.
#[derive(Debug, Clone, Copy)]
pub struct RenderTimings {
    pub settle: Duration,
    pub secondary_settle: Duration,
}

impl From<&FetchConfig> for RenderTimings {
    fn from(config: &FetchConfig) -> Self {
        Self {
            settle: config.settle_delay,
            secondary_settle: config.secondary_settle_delay,
        }
    }
}

impl Default for RenderTimings {
    fn default() -> Self {
        RenderTimings::from(&FetchConfig::default())
    }
}

/// Live requirements extraction for one country.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn country(&self) -> CountryCode;

    /// Fetch the country's sources and build a result from them.
    async fn extract(&self, fetcher: &dyn Fetcher) -> Result<RequirementsResult, ExtractionError>;

    /// Curated result served when live extraction fails.
    fn fallback(&self) -> RequirementsResult {
        fallback::fallback_for(self.country())
    }
}

/// Run live extraction, falling back to the curated payload on any error.
pub async fn collect(extractor: &dyn Extractor, fetcher: &dyn Fetcher) -> RequirementsResult {
    let country = extractor.country();
    let start = Instant::now();
    match extractor.extract(fetcher).await {
        Ok(result) => {
            info!(
                %country,
                documents = result.documents.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "extracted requirements"
            );
            result
        }
        Err(e) => {
            warn!(%country, error = %e, "live extraction failed, serving fallback");
            extractor.fallback()
        }
    }
}
