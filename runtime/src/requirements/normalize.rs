//! Ordered rule tables mapping raw requirement text to canonical labels.
//!
//! Each country declares its own static table of [`NormalizationRule`]s.
//! A fragment is labelled by the first rule that matches it, compared
//! case-insensitively; what happens to fragments no rule matches is decided
//! by the caller through [`Unmatched`].

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// What a rule looks for in a fragment.
#[derive(Debug, Clone, Copy)]
pub enum Pattern {
    /// Plain substring.
    Keyword(&'static str),
    /// Regular expression.
    Regex(&'static str),
}

/// A pattern paired with the canonical label it produces.
#[derive(Debug, Clone, Copy)]
pub struct NormalizationRule {
    pub pattern: Pattern,
    pub label: &'static str,
}

impl NormalizationRule {
    pub const fn keyword(keyword: &'static str, label: &'static str) -> Self {
        Self {
            pattern: Pattern::Keyword(keyword),
            label,
        }
    }

    pub const fn regex(pattern: &'static str, label: &'static str) -> Self {
        Self {
            pattern: Pattern::Regex(pattern),
            label,
        }
    }
}

/// Treatment of fragments no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unmatched {
    Drop,
    /// Keep the fragment text itself as the label.
    PassThrough,
}

#[derive(Debug)]
enum Matcher {
    Keyword(String),
    Regex(Regex),
}

impl Matcher {
    fn matches(&self, text: &str, lowered: &str) -> bool {
        match self {
            Matcher::Keyword(k) => lowered.contains(k.as_str()),
            Matcher::Regex(re) => re.is_match(text),
        }
    }
}

/// A compiled, ordered rule table.
#[derive(Debug)]
pub struct RuleTable {
    rules: Vec<(Matcher, &'static str)>,
}

impl RuleTable {
    pub fn compile(rules: &[NormalizationRule]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|rule| {
                let matcher = match rule.pattern {
                    Pattern::Keyword(k) => Matcher::Keyword(k.to_lowercase()),
                    Pattern::Regex(p) => {
                        Matcher::Regex(RegexBuilder::new(p).case_insensitive(true).build()?)
                    }
                };
                Ok((matcher, rule.label))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// Canonical labels in table order, without duplicates.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .map(|(_, label)| *label)
            .filter(|label| seen.insert(*label))
            .collect()
    }

    /// Label of the first rule matching `text`.
    pub fn label_for(&self, text: &str) -> Option<&'static str> {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|(matcher, _)| matcher.matches(text, &lowered))
            .map(|(_, label)| *label)
    }

    /// Label every fragment and drop repeated labels, keeping discovery order.
    pub fn normalize<I, S>(&self, fragments: I, unmatched: Unmatched) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labelled = fragments.into_iter().filter_map(|fragment| {
            let fragment = fragment.as_ref();
            match (self.label_for(fragment), unmatched) {
                (Some(label), _) => Some(label.to_string()),
                (None, Unmatched::PassThrough) => Some(fragment.to_string()),
                (None, Unmatched::Drop) => None,
            }
        });
        dedupe(labelled)
    }
}

/// Remove exact duplicates, keeping the first occurrence of each item.
pub fn dedupe<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Keep at most `cap` items from the front.
pub fn truncate(mut items: Vec<String>, cap: usize) -> Vec<String> {
    items.truncate(cap);
    items
}
