//! UK Student visa requirements from GOV.UK.
//!
//! The page is server-rendered, so a static fetch is enough. Requirement
//! bullets are the list items in `<main>` that mention at least one of a
//! fixed set of keywords.

use super::normalize::{dedupe, truncate};
use super::{html, CountryCode, Extractor, RequirementsResult};
use crate::error::ExtractionError;
use crate::fetch::Fetcher;
use async_trait::async_trait;
use scraper::Html;

pub const SOURCE_URL: &str = "https://www.gov.uk/student-visa";

pub const VISA_TYPE: &str = "Student Visa";
pub const LANGUAGE_REQUIREMENTS: &str = "IELTS or equivalent required by institutions.";
pub const TIMELINE: &str = "Apply up to 6 months before your course starts.";

const KEYWORDS: &[&str] = &[
    "passport",
    "confirmation",
    "financial",
    "english",
    "tuberculosis",
    "offer",
    "place",
    "support",
    "money",
    "funds",
    "pay",
    "course",
    "consent",
    "parents",
    "timeline",
    "weeks",
    "before",
    "apply",
    "fee",
    "switch",
    "extend",
    "graduate",
    "stay",
];

pub struct UkExtractor;

/// List items under `<main>` that mention a requirement keyword.
pub fn parse_documents(page: &str) -> Result<Vec<String>, ExtractionError> {
    let document = Html::parse_document(page);
    let main = html::first(&document, "main")?
        .ok_or_else(|| ExtractionError::Parse("no <main> element".to_string()))?;

    Ok(html::texts_in(main, "ul li")?
        .into_iter()
        .filter(|text| {
            let lowered = text.to_lowercase();
            KEYWORDS.iter().any(|k| lowered.contains(k))
        })
        .collect())
}

#[async_trait]
impl Extractor for UkExtractor {
    fn country(&self) -> CountryCode {
        CountryCode::Uk
    }

    async fn extract(&self, fetcher: &dyn Fetcher) -> Result<RequirementsResult, ExtractionError> {
        let page = fetcher.fetch_static(SOURCE_URL).await?;
        let documents = truncate(dedupe(parse_documents(&page)?), self.country().document_cap());

        Ok(RequirementsResult::new(
            CountryCode::Uk,
            documents,
            LANGUAGE_REQUIREMENTS,
            TIMELINE,
            &[SOURCE_URL],
        )
        .with_visa_type(VISA_TYPE))
    }
}
