//! Canada study permit requirements from the IRCC application page.
//!
//! The page is assembled client-side, so it is rendered in Chromium. The
//! document checklist lives in `section#get-documents`; two items carry
//! awkward upload instructions and are rewritten, and navigation boilerplate
//! is dropped. Fewer than three surviving documents means the page did not
//! render as expected and the curated list is used instead.

use super::normalize::{truncate, NormalizationRule, RuleTable, Unmatched};
use super::{html, CountryCode, Extractor, RenderTimings, RequirementsResult};
use crate::error::ExtractionError;
use crate::fetch::{with_rendered_session, Fetcher};
use async_trait::async_trait;
use chrono::Utc;
use scraper::Html;
use std::sync::OnceLock;

pub const SOURCE_URL: &str =
    "https://www.canada.ca/en/immigration-refugees-citizenship/services/study-canada/study-permit/apply.html";
pub const GUIDE_URL: &str =
    "https://www.canada.ca/en/immigration-refugees-citizenship/services/application/application-forms-guides/guide-5269-applying-study-permit-outside-canada.html";

pub const VISA_TYPE: &str = "Study Permit";
pub const LANGUAGE_REQUIREMENTS: &str = "IELTS/TOEFL/CELPIP required by institution";
pub const TIMELINE: &str = "Apply 3-6 months before program start";

/// Live results with fewer documents than this are discarded.
pub const MIN_DOCUMENTS: usize = 3;

const SUBSTITUTIONS: &[NormalizationRule] = &[
    NormalizationRule::keyword(
        "upload your PAL",
        "Provincial Attestation Letter (PAL) or Territorial Attestation Letter (TAL)",
    ),
    NormalizationRule::keyword(
        "as many of the documents needed",
        "All required supporting documents",
    ),
];

/// Phrases marking instructions rather than documents.
const BOILERPLATE: &[&str] = &["We won't", "Waiting to submit", "upload your PAL"];

fn substitutions() -> &'static RuleTable {
    static TABLE: OnceLock<RuleTable> = OnceLock::new();
    TABLE.get_or_init(|| RuleTable::compile(SUBSTITUTIONS).expect("canada rules are valid"))
}

pub fn links() -> [&'static str; 2] {
    [SOURCE_URL, GUIDE_URL]
}

pub struct CanadaExtractor {
    timings: RenderTimings,
}

impl CanadaExtractor {
    pub fn new(timings: RenderTimings) -> Self {
        Self { timings }
    }
}

/// Checklist items from `section#get-documents`, rewritten and filtered.
pub fn parse_documents(page: &str) -> Result<Vec<String>, ExtractionError> {
    let document = Html::parse_document(page);
    let Some(section) = html::first(&document, "section#get-documents")? else {
        return Ok(Vec::new());
    };

    let items = html::texts_in(section, "li")?;
    Ok(substitutions()
        .normalize(items, Unmatched::PassThrough)
        .into_iter()
        .filter(|text| !BOILERPLATE.iter().any(|phrase| text.contains(phrase)))
        .collect())
}

#[async_trait]
impl Extractor for CanadaExtractor {
    fn country(&self) -> CountryCode {
        CountryCode::Canada
    }

    async fn extract(&self, fetcher: &dyn Fetcher) -> Result<RequirementsResult, ExtractionError> {
        let settle = self.timings.settle;
        let page = with_rendered_session(fetcher, |session| {
            Box::pin(async move { Ok::<_, ExtractionError>(session.render(SOURCE_URL, settle).await?) })
        })
        .await?;

        let documents = parse_documents(&page)?;
        if documents.len() < MIN_DOCUMENTS {
            return Err(ExtractionError::Sparse {
                found: documents.len(),
                required: MIN_DOCUMENTS,
            });
        }

        let mut result = RequirementsResult::new(
            CountryCode::Canada,
            truncate(documents, self.country().document_cap()),
            LANGUAGE_REQUIREMENTS,
            TIMELINE,
            &links(),
        )
        .with_visa_type(VISA_TYPE);
        result.used_fallback = Some(false);
        result.last_updated = Some(Utc::now());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_and_filters_checklist_items() {
        let page = r#"
            <section id="get-documents"><ul>
              <li>a letter of acceptance</li>
              <li>You must upload your PAL with your application</li>
              <li>Upload as many of the documents needed as you can</li>
              <li>We won't process incomplete applications</li>
              <li>Waiting to submit your biometrics?</li>
              <li>proof of identity</li>
            </ul></section>
        "#;
        assert_eq!(
            parse_documents(page).unwrap(),
            vec![
                "a letter of acceptance",
                "Provincial Attestation Letter (PAL) or Territorial Attestation Letter (TAL)",
                "All required supporting documents",
                "proof of identity",
            ]
        );
    }

    #[test]
    fn test_missing_section_yields_nothing() {
        assert!(parse_documents("<main><ul><li>passport</li></ul></main>")
            .unwrap()
            .is_empty());
    }
}
