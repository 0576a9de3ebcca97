//! Germany student visa requirements.
//!
//! Make it in Germany is rendered first; if its document list cannot be
//! located, the Federal Foreign Office page is rendered in the same browser
//! session. Extracted fragments are only used to order the canonical
//! checklist: every label of the table is always part of the result.

use super::normalize::{truncate, NormalizationRule, RuleTable, Unmatched};
use super::{html, CountryCode, Extractor, RenderTimings, RequirementsResult};
use crate::error::ExtractionError;
use crate::fetch::{with_rendered_session, Fetcher};
use crate::renderer::RenderSession;
use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::OnceLock;
use tracing::debug;

pub const PRIMARY_URL: &str = "https://www.make-it-in-germany.com/en/visa-residence/student-visa";
pub const SECONDARY_URL: &str =
    "https://www.auswaertiges-amt.de/en/visa-service/visabestimmungen-node/studium-en/606846";

pub const VISA_TYPE: &str = "Student Visa";
pub const LANGUAGE_REQUIREMENTS: &str =
    "German: TestDaF/Goethe (B2-C1) or English: IELTS/TOEFL (university-specific)";
pub const TIMELINE: &str = "Apply 3-6 months before studies begin";

pub const DOCUMENT_RULES: &[NormalizationRule] = &[
    NormalizationRule::regex(r"passport|reisepass", "Valid passport (with 2+ blank pages)"),
    NormalizationRule::regex(
        r"admission|zulassung|acceptance",
        "University admission letter (Zulassungsbescheid)",
    ),
    NormalizationRule::regex(
        r"financial|finan|blocked account",
        "Proof of financial resources (€11,904/year in blocked account)",
    ),
    NormalizationRule::regex(
        r"insurance|krankenversicherung",
        "Health insurance coverage confirmation",
    ),
    NormalizationRule::regex(
        r"application form|antragsformular",
        "Completed visa application forms (2 copies)",
    ),
    NormalizationRule::regex(r"photo|bild|biometric", "Biometric passport photos (35x45mm)"),
    NormalizationRule::regex(
        r"academic|qualification|zeugnis",
        "Academic qualifications (certified copies)",
    ),
    NormalizationRule::regex(
        r"curriculum vitae|lebenslauf|cv",
        "Curriculum vitae (tabular format)",
    ),
    NormalizationRule::regex(
        r"motivation|motivational",
        "Motivational letter explaining study plans",
    ),
    NormalizationRule::regex(r"language|sprachkenntnisse", "Language proficiency certificate"),
    NormalizationRule::regex(r"fee|gebühr", "Fee payment confirmation (€75)"),
];

/// Minimum lengths for fragments taken from each kind of markup.
const MIN_LIST_ITEM_CHARS: usize = 10;
const MIN_PARAGRAPH_PART_CHARS: usize = 20;
const MIN_SECONDARY_ITEM_CHARS: usize = 30;

pub fn document_rules() -> &'static RuleTable {
    static TABLE: OnceLock<RuleTable> = OnceLock::new();
    TABLE.get_or_init(|| RuleTable::compile(DOCUMENT_RULES).expect("germany rules are valid"))
}

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)documents.*need").expect("heading regex is valid"))
}

fn citation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[\d+\]").expect("citation regex is valid"))
}

pub fn links() -> [&'static str; 2] {
    [PRIMARY_URL, SECONDARY_URL]
}

pub struct GermanyExtractor {
    timings: RenderTimings,
}

impl GermanyExtractor {
    pub fn new(timings: RenderTimings) -> Self {
        Self { timings }
    }
}

/// The block holding the document list: the section around a "documents
/// you need" heading, the rich-text block after it, or `section#documents`.
fn documents_section(document: &Html) -> Result<Option<ElementRef<'_>>, ExtractionError> {
    if let Some(heading) = html::find_heading(document, "h2", |t| heading_pattern().is_match(t))? {
        let section = html::closest(heading, "section")
            .or_else(|| html::find_next(document, heading, "div", Some("rich-text")));
        if section.is_some() {
            return Ok(section);
        }
    }
    html::first(document, "section#documents")
}

pub fn parse_primary(page: &str) -> Result<Vec<String>, ExtractionError> {
    let document = Html::parse_document(page);
    let Some(section) = documents_section(&document)? else {
        return Ok(Vec::new());
    };

    let fragments: Vec<String> = html::texts_in(section, "ul li")?
        .into_iter()
        .map(|t| citation_pattern().replace_all(&t, "").trim().to_string())
        .filter(|t| t.chars().count() > MIN_LIST_ITEM_CHARS)
        .collect();
    if !fragments.is_empty() {
        return Ok(fragments);
    }

    Ok(html::texts_in(section, "p")?
        .into_iter()
        .filter(|p| p.contains('•') || p.contains(':'))
        .flat_map(|p| {
            p.split(['•', ':'])
                .map(str::trim)
                .filter(|part| part.chars().count() > MIN_PARAGRAPH_PART_CHARS)
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .collect())
}

/// Table rows, or failing that long list items, from the Foreign Office page.
pub fn parse_secondary(page: &str) -> Result<Vec<String>, ExtractionError> {
    let document = Html::parse_document(page);
    let Some(content) = html::first(&document, "div#content")? else {
        return Ok(Vec::new());
    };

    let rows = html::table_rows(content)?;
    if !rows.is_empty() {
        return Ok(rows);
    }

    Ok(html::texts_in(content, "li")?
        .into_iter()
        .filter(|t| t.chars().count() > MIN_SECONDARY_ITEM_CHARS)
        .collect())
}

/// Canonical checklist: labels in discovery order, then every label not yet
/// seen, capped at `cap`.
pub fn checklist<I, S>(fragments: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let rules = document_rules();
    let mut documents = rules.normalize(fragments, Unmatched::Drop);
    for label in rules.labels() {
        if !documents.iter().any(|d| d == label) {
            documents.push(label.to_string());
        }
    }
    truncate(documents, cap)
}

async fn render_fragments(
    session: &mut dyn RenderSession,
    timings: RenderTimings,
) -> Result<Vec<String>, ExtractionError> {
    let page = session.render(PRIMARY_URL, timings.settle).await?;
    let fragments = parse_primary(&page)?;
    if !fragments.is_empty() {
        return Ok(fragments);
    }

    debug!("no document section on primary source, trying {SECONDARY_URL}");
    let page = session.render(SECONDARY_URL, timings.secondary_settle).await?;
    parse_secondary(&page)
}

#[async_trait]
impl Extractor for GermanyExtractor {
    fn country(&self) -> CountryCode {
        CountryCode::Germany
    }

    async fn extract(&self, fetcher: &dyn Fetcher) -> Result<RequirementsResult, ExtractionError> {
        let timings = self.timings;
        let fragments = with_rendered_session(fetcher, |session| {
            Box::pin(render_fragments(session, timings))
        })
        .await?;

        Ok(RequirementsResult::new(
            CountryCode::Germany,
            checklist(fragments, self.country().document_cap()),
            LANGUAGE_REQUIREMENTS,
            TIMELINE,
            &links(),
        )
        .with_visa_type(VISA_TYPE))
    }
}
