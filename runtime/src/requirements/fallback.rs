//! Curated results served when live extraction fails.
//!
//! Only Canada reports `used_fallback` and a timestamp; the other countries
//! return their payload without marking it as a fallback.

use super::{canada, germany, uk, usa, CountryCode, RequirementsResult};
use chrono::Utc;

const CANADA_DOCUMENTS: &[&str] = &[
    "Letter of acceptance from a designated learning institution (DLI)",
    "Provincial Attestation Letter (PAL) from the province/territory",
    "Proof of financial support (minimum $20,635 for 2025)",
    "Valid passport/travel document",
    "Medical exam results (if required)",
    "Police certificate (if required)",
];

const UK_DOCUMENTS: &[&str] = &[
    "A current passport or other valid travel document",
    "Confirmation of Acceptance for Studies (CAS) from your course provider",
    "Proof you have enough money to support yourself and pay for your course",
    "Proof of your knowledge of English (Secure English Language Test or equivalent)",
    "Tuberculosis test results (if required for your country)",
    "Written consent from your parents or legal guardian (if you are under 18)",
];

const USA_DOCUMENTS: &[&str] = &[
    "Valid passport (6+ months validity)",
    "Form I-20 from SEVP-approved school",
    "DS-160 confirmation page",
    "SEVIS I-901 fee receipt ($350)",
    "Visa application fee payment ($185)",
    "Proof of financial support (tuition + living expenses)",
    "Academic transcripts and diplomas",
    "Standardized test scores (if required by institution)",
    "Passport-style photograph",
    "Evidence of intent to return home after studies",
];

const USA_VISA_TYPES: &[&str] = &["F-1 (Academic)", "M-1 (Vocational)", "J-1 (Exchange)"];

const USA_NOTES: &[&str] = &[
    "Initial entry permitted 30 days before program start",
    "On-campus work limited to 20 hrs/week during semester",
    "OPT work authorization requires separate application",
];

/// Number of leading labels of the Germany table kept in its fallback.
const GERMANY_FALLBACK_DOCUMENTS: usize = 6;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The curated payload for `country`.
pub fn fallback_for(country: CountryCode) -> RequirementsResult {
    match country {
        CountryCode::Canada => {
            let mut result = RequirementsResult::new(
                country,
                owned(CANADA_DOCUMENTS),
                canada::LANGUAGE_REQUIREMENTS,
                canada::TIMELINE,
                &canada::links(),
            )
            .with_visa_type(canada::VISA_TYPE);
            result.used_fallback = Some(true);
            result.last_updated = Some(Utc::now());
            result
        }
        CountryCode::Uk => RequirementsResult::new(
            country,
            owned(UK_DOCUMENTS),
            uk::LANGUAGE_REQUIREMENTS,
            uk::TIMELINE,
            &[uk::SOURCE_URL],
        )
        .with_visa_type(uk::VISA_TYPE),
        CountryCode::Usa => RequirementsResult::new(
            country,
            owned(USA_DOCUMENTS),
            usa::LANGUAGE_REQUIREMENTS,
            usa::TIMELINE,
            &usa::links(),
        )
        .with_visa_types(owned(USA_VISA_TYPES))
        .with_fees(usa::FEES)
        .with_special_notes(USA_NOTES),
        CountryCode::Germany => RequirementsResult::new(
            country,
            germany::DOCUMENT_RULES
                .iter()
                .take(GERMANY_FALLBACK_DOCUMENTS)
                .map(|rule| rule.label.to_string())
                .collect(),
            germany::LANGUAGE_REQUIREMENTS,
            germany::TIMELINE,
            &germany::links(),
        )
        .with_visa_type(germany::VISA_TYPE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fallbacks_respect_result_invariants() {
        for country in CountryCode::ALL {
            let result = fallback_for(country);
            assert_eq!(result.country, country.name());
            assert!(result.documents.len() <= country.document_cap(), "{country} over cap");
            let unique: HashSet<_> = result.documents.iter().collect();
            assert_eq!(unique.len(), result.documents.len(), "{country} has duplicates");
            assert!(!result.official_links.is_empty(), "{country} has no links");
            for link in &result.official_links {
                assert!(url::Url::parse(link).is_ok(), "{link} is not a URL");
            }
        }
    }

    #[test]
    fn test_only_canada_marks_fallback() {
        let canada = fallback_for(CountryCode::Canada);
        assert_eq!(canada.used_fallback, Some(true));
        assert!(canada.last_updated.is_some());

        for country in [CountryCode::Uk, CountryCode::Usa, CountryCode::Germany] {
            let result = fallback_for(country);
            assert_eq!(result.used_fallback, None);
            assert_eq!(result.last_updated, None);
        }
    }

    #[test]
    fn test_germany_fallback_is_head_of_table() {
        let result = fallback_for(CountryCode::Germany);
        assert_eq!(result.documents.len(), 6);
        assert_eq!(result.documents[0], "Valid passport (with 2+ blank pages)");
        assert_eq!(result.documents[5], "Biometric passport photos (35x45mm)");
    }
}
