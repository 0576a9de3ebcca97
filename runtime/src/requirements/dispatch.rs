//! Country name resolution and extractor lookup.

use super::canada::CanadaExtractor;
use super::germany::GermanyExtractor;
use super::uk::UkExtractor;
use super::usa::UsaExtractor;
use super::{collect, CountryCode, Extractor, RenderTimings, RequirementsResult};
use crate::error::RequirementsError;
use crate::fetch::Fetcher;
use std::collections::HashMap;
use tracing::info;

/// Aliases in match order. An alias may appear anywhere in the input.
const ALIASES: &[(&str, CountryCode)] = &[
    ("canada", CountryCode::Canada),
    ("uk", CountryCode::Uk),
    ("united kingdom", CountryCode::Uk),
    ("usa", CountryCode::Usa),
    ("united states", CountryCode::Usa),
    ("america", CountryCode::Usa),
    ("germany", CountryCode::Germany),
];

/// Resolve free text such as `" United Kingdom "` to a country.
pub fn resolve(input: &str) -> Option<CountryCode> {
    let needle = input.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| needle.contains(alias))
        .map(|(_, country)| *country)
}

/// Routes requests to the extractor of the requested country.
pub struct Dispatcher {
    extractors: HashMap<CountryCode, Box<dyn Extractor>>,
}

impl Dispatcher {
    pub fn new(timings: RenderTimings) -> Self {
        let extractors: Vec<Box<dyn Extractor>> = vec![
            Box::new(CanadaExtractor::new(timings)),
            Box::new(UkExtractor),
            Box::new(UsaExtractor::new(timings)),
            Box::new(GermanyExtractor::new(timings)),
        ];
        Self::with_extractors(extractors)
    }

    /// Build a dispatcher from explicit extractors, one per country.
    pub fn with_extractors(extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self {
            extractors: extractors.into_iter().map(|e| (e.country(), e)).collect(),
        }
    }

    pub fn extractor(&self, country: CountryCode) -> Option<&dyn Extractor> {
        self.extractors.get(&country).map(|e| e.as_ref())
    }

    /// Canonical names of the countries with an extractor.
    pub fn supported(&self) -> Vec<&'static str> {
        CountryCode::ALL
            .into_iter()
            .filter(|c| self.extractors.contains_key(c))
            .map(CountryCode::name)
            .collect()
    }

    /// Requirements for the country named by `input`.
    ///
    /// Extraction failures are absorbed by the fallback payloads; the only
    /// error is an input that names no supported country.
    pub async fn requirements(
        &self,
        input: &str,
        fetcher: &dyn Fetcher,
    ) -> Result<RequirementsResult, RequirementsError> {
        let extractor = resolve(input)
            .and_then(|country| self.extractor(country))
            .ok_or_else(|| RequirementsError::UnsupportedCountry(input.to_string()))?;

        info!(input, country = %extractor.country(), "dispatching requirements request");
        Ok(collect(extractor, fetcher).await)
    }
}
