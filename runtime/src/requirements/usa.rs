//! USA F/M/J student visa requirements from the State Department.
//!
//! travel.state.gov is rendered in Chromium; when its documentation list
//! cannot be found, the static usa.gov summary is used instead. Whatever the
//! sources yield, the six essential documents are always part of the
//! result.

use super::normalize::{dedupe, NormalizationRule, RuleTable, Unmatched};
use super::{html, CountryCode, Extractor, RenderTimings, RequirementsResult};
use crate::error::ExtractionError;
use crate::fetch::{with_rendered_session, Fetcher};
use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;
use tracing::debug;

pub const PRIMARY_URL: &str =
    "https://travel.state.gov/content/travel/en/us-visas/study/student-visa.html";
pub const SECONDARY_URL: &str = "https://www.usa.gov/student-visa";

const PRIMARY_HEADING: &str = "Gather Required Documentation";
const SECONDARY_HEADING: &str = "Student visa requirements";

/// List items this short are navigation, not documents.
const MIN_ITEM_CHARS: usize = 15;

pub const LANGUAGE_REQUIREMENTS: &str = "TOEFL/IELTS/Duolingo required by institution";
pub const TIMELINE: &str = "Apply 3-6 months before program start";
pub const EARLY_TIMELINE: &str =
    "Apply up to 12 months before program start (entry permitted 30 days before)";
pub const FEES: &str = "$535 total ($350 SEVIS + $185 application)";

const DEFAULT_VISA_TYPES: &[&str] = &[
    "F-1 (Academic Studies)",
    "M-1 (Vocational Studies)",
    "J-1 (Exchange Programs)",
];

const SPECIAL_NOTES: &[&str] = &[
    "New 2025: Enhanced social media screening during application",
    "Maintain full-time enrollment to keep visa status valid",
    "OPT available for 12 months post-graduation (36 months for STEM)",
];

const STANDARD_NAMES: &[NormalizationRule] = &[
    NormalizationRule::keyword("passport", "Valid passport (with 6+ months validity beyond stay)"),
    NormalizationRule::keyword(
        "form i-20",
        "Form I-20 (Certificate of Eligibility from SEVP-approved school)",
    ),
    NormalizationRule::keyword("ds-160", "DS-160 confirmation page"),
    NormalizationRule::keyword("photo", "Passport-style photograph meeting requirements"),
];

/// Phrases that mention a category without being that document, removed
/// before checking coverage. The standard photo label says "passport-style".
const NON_COVERING: &[&str] = &["passport-style"];

/// Document categories every result must cover, keyed by the substring that
/// shows a document already covers the category.
pub const ESSENTIALS: &[(&str, &str)] = &[
    ("passport", "Valid passport (with 6+ months validity)"),
    ("i-20", "Form I-20 from SEVP-approved school"),
    ("ds-160", "DS-160 confirmation page"),
    ("sevis", "SEVIS fee payment receipt"),
    ("financial", "Proof of financial support for tuition/living expenses"),
    ("academic", "Academic transcripts and diplomas"),
];

fn standard_names() -> &'static RuleTable {
    static TABLE: OnceLock<RuleTable> = OnceLock::new();
    TABLE.get_or_init(|| RuleTable::compile(STANDARD_NAMES).expect("usa rules are valid"))
}

fn early_timeline_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)365 days before").expect("timeline regex is valid"))
}

pub fn links() -> [&'static str; 2] {
    [PRIMARY_URL, SECONDARY_URL]
}

/// What the State Department page yields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimaryPage {
    pub documents: Vec<String>,
    /// The page announces the 365-day application window.
    pub early_timeline: bool,
    /// `"type: purpose"` rows from the visa category table.
    pub visa_types: Vec<String>,
}

pub struct UsaExtractor {
    timings: RenderTimings,
}

impl UsaExtractor {
    pub fn new(timings: RenderTimings) -> Self {
        Self { timings }
    }
}

pub fn parse_primary(page: &str) -> Result<PrimaryPage, ExtractionError> {
    let document = Html::parse_document(page);

    let mut documents = Vec::new();
    if let Some(heading) =
        html::find_heading(&document, "h2", |t| t.eq_ignore_ascii_case(PRIMARY_HEADING))?
    {
        if let Some(list) = html::find_next(&document, heading, "ul", None) {
            let items = html::texts_in(list, "li")?
                .into_iter()
                .filter(|t| t.chars().count() > MIN_ITEM_CHARS);
            documents = standard_names().normalize(items, Unmatched::PassThrough);
        }
    }

    let early_timeline = early_timeline_pattern().is_match(&html::document_text(&document));

    let visa_types = match html::first(&document, "table")? {
        Some(table) => html::table_body_rows(table)?,
        None => Vec::new(),
    };

    Ok(PrimaryPage {
        documents,
        early_timeline,
        visa_types,
    })
}

/// Requirement bullets from the usa.gov summary page.
pub fn parse_secondary(page: &str) -> Result<Vec<String>, ExtractionError> {
    let document = Html::parse_document(page);
    let Some(heading) =
        html::find_heading(&document, "h2", |t| t.eq_ignore_ascii_case(SECONDARY_HEADING))?
    else {
        return Ok(Vec::new());
    };
    match html::find_next(&document, heading, "ul", None) {
        Some(list) => html::texts_in(list, "li"),
        None => Ok(Vec::new()),
    }
}

/// Deduplicate, cap at `cap` and make sure every essential is covered.
///
/// When documents must be dropped to make room, the first document covering
/// each essential is kept and the other documents are cut from the tail.
pub fn with_essentials(documents: Vec<String>, cap: usize) -> Vec<String> {
    let documents = dedupe(documents);
    let lowered: Vec<String> = documents
        .iter()
        .map(|d| {
            NON_COVERING
                .iter()
                .fold(d.to_lowercase(), |text, phrase| text.replace(phrase, ""))
        })
        .collect();

    let mut protected = vec![false; documents.len()];
    let mut missing = Vec::new();
    for (key, label) in ESSENTIALS {
        match lowered.iter().position(|d| d.contains(key)) {
            Some(i) => protected[i] = true,
            None => missing.push(label.to_string()),
        }
    }

    let protected_count = protected.iter().filter(|p| **p).count();
    let mut room = cap.saturating_sub(protected_count + missing.len());

    let mut kept: Vec<String> = documents
        .into_iter()
        .zip(protected)
        .filter_map(|(doc, protected)| {
            if protected {
                Some(doc)
            } else if room > 0 {
                room -= 1;
                Some(doc)
            } else {
                None
            }
        })
        .collect();
    kept.extend(missing);
    kept
}

#[async_trait]
impl Extractor for UsaExtractor {
    fn country(&self) -> CountryCode {
        CountryCode::Usa
    }

    async fn extract(&self, fetcher: &dyn Fetcher) -> Result<RequirementsResult, ExtractionError> {
        let settle = self.timings.settle;
        let page = with_rendered_session(fetcher, |session| {
            Box::pin(async move { Ok::<_, ExtractionError>(session.render(PRIMARY_URL, settle).await?) })
        })
        .await?;

        let primary = parse_primary(&page)?;
        let mut documents = primary.documents;
        if documents.is_empty() {
            debug!("no documentation list on primary source, trying {SECONDARY_URL}");
            let page = fetcher.fetch_static(SECONDARY_URL).await?;
            documents = parse_secondary(&page)?;
        }

        let timeline = if primary.early_timeline {
            EARLY_TIMELINE
        } else {
            TIMELINE
        };

        let visa_types = if primary.visa_types.is_empty() {
            DEFAULT_VISA_TYPES.iter().map(|v| v.to_string()).collect()
        } else {
            primary.visa_types
        };

        Ok(RequirementsResult::new(
            CountryCode::Usa,
            with_essentials(documents, self.country().document_cap()),
            LANGUAGE_REQUIREMENTS,
            timeline,
            &links(),
        )
        .with_visa_types(visa_types)
        .with_fees(FEES)
        .with_special_notes(SPECIAL_NOTES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMARY: &str = r#"
        <html><body>
          <h2>Gather Required Documentation</h2>
          <ul>
            <li>Passport valid for travel to the United States</li>
            <li>Nonimmigrant Visa Application, Form DS-160 confirmation page</li>
            <li>Photo</li>
            <li>Form I-20 issued by your school</li>
            <li>A photo that meets the photograph requirements</li>
            <li>Transcripts, diplomas, degrees or certificates from schools attended</li>
          </ul>
          <p>Visas can be issued up to 365 days before the start date.</p>
          <table>
            <tr><th>Visa</th><th>Purpose</th></tr>
            <tr><td>F</td><td>Academic study</td></tr>
            <tr><td>M</td><td>Vocational study</td></tr>
          </table>
        </body></html>
    "#;

    #[test]
    fn test_primary_standardizes_known_documents() {
        let parsed = parse_primary(PRIMARY).unwrap();
        assert_eq!(
            parsed.documents,
            vec![
                "Valid passport (with 6+ months validity beyond stay)",
                "DS-160 confirmation page",
                "Form I-20 (Certificate of Eligibility from SEVP-approved school)",
                "Passport-style photograph meeting requirements",
                "Transcripts, diplomas, degrees or certificates from schools attended",
            ]
        );
        assert!(parsed.early_timeline);
        assert_eq!(parsed.visa_types, vec!["F: Academic study", "M: Vocational study"]);
    }

    #[test]
    fn test_primary_without_heading_is_empty() {
        let parsed = parse_primary("<h2>Other</h2><ul><li>Passport valid for travel</li></ul>")
            .unwrap();
        assert!(parsed.documents.is_empty());
        assert!(!parsed.early_timeline);
        assert!(parsed.visa_types.is_empty());
    }

    #[test]
    fn test_secondary_takes_every_item() {
        let page = r#"<h2>Student visa requirements</h2><ul><li>I-20</li><li>Passport</li></ul>"#;
        assert_eq!(parse_secondary(page).unwrap(), vec!["I-20", "Passport"]);
    }

    #[test]
    fn test_essentials_added_when_missing() {
        let docs = with_essentials(vec!["Bank letter".to_string()], 12);
        assert_eq!(docs[0], "Bank letter");
        for (key, _) in ESSENTIALS {
            assert!(docs.iter().any(|d| d.to_lowercase().contains(key)), "missing {key}");
        }
        assert_eq!(docs.len(), 1 + ESSENTIALS.len());
    }

    #[test]
    fn test_covered_essentials_not_duplicated() {
        let docs = with_essentials(
            vec![
                "Form I-20 (Certificate of Eligibility from SEVP-approved school)".to_string(),
                "SEVIS I-901 fee receipt".to_string(),
            ],
            12,
        );
        assert_eq!(docs.iter().filter(|d| d.contains("I-20")).count(), 1);
        assert_eq!(docs.iter().filter(|d| d.contains("SEVIS")).count(), 1);
    }

    #[test]
    fn test_photo_label_does_not_cover_passport() {
        let page = r#"<h2>Gather Required Documentation</h2>
            <ul><li>A photo that meets the photograph requirements</li></ul>"#;
        let docs = with_essentials(parse_primary(page).unwrap().documents, 12);
        assert_eq!(docs[0], "Passport-style photograph meeting requirements");
        assert!(docs.contains(&"Valid passport (with 6+ months validity)".to_string()));
        assert_eq!(docs.len(), 1 + ESSENTIALS.len());
    }

    #[test]
    fn test_visa_table_header_row_skipped_even_with_td_cells() {
        let page = r#"<table>
            <tr><td>Visa Category</td><td>Purpose</td></tr>
            <tr><td>F</td><td>Academic</td></tr>
        </table>"#;
        assert_eq!(parse_primary(page).unwrap().visa_types, vec!["F: Academic"]);
    }

    #[test]
    fn test_cap_keeps_essentials() {
        let mut docs: Vec<String> = (1..=20).map(|i| format!("Supporting document {i}")).collect();
        docs.push("Academic transcripts".to_string());
        docs.push("Supporting document 3".to_string());

        let kept = with_essentials(docs, 12);
        assert_eq!(kept.len(), 12);
        for (key, _) in ESSENTIALS {
            assert!(kept.iter().any(|d| d.to_lowercase().contains(key)), "missing {key}");
        }
        assert!(kept.contains(&"Academic transcripts".to_string()));
        assert!(kept.contains(&"Supporting document 1".to_string()));
        assert!(!kept.contains(&"Supporting document 20".to_string()));
    }
}
