//! Cross-source answer validation

use serde::{Deserialize, Serialize};

use vitrine_core::{ExtractedPage, PageData};

/// Independent sources an answer can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The structured record extracted from the page
    Structured,
    /// The raw page text
    Text,
    /// The original markup
    Markup,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Structured, Source::Text, Source::Markup];
}

/// Thresholds for the validation checks.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Minimum corroborating sources for an answer to be trusted
    pub min_sources: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { min_sources: 2 }
    }
}

impl ValidatorConfig {
    pub fn with_min_sources(mut self, min_sources: usize) -> Self {
        self.min_sources = min_sources;
        self
    }
}

/// Outcome of validating one candidate answer. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the answer may reach the user as-is
    pub valid: bool,
    /// How many sources corroborated the answer
    pub matched_sources: usize,
    /// Deterministic substitute, filled by the caller on rejection
    pub fallback: Option<String>,
}

/// Validates candidate answers against the page they claim to describe.
///
/// Holds lower-cased serializations of each source so repeated checks on
/// one page do not re-serialize.
pub struct ResponseValidator {
    structured: PageData,
    structured_lower: String,
    text: String,
    text_lower: String,
    markup_lower: String,
    config: ValidatorConfig,
}

impl ResponseValidator {
    pub fn new(structured: PageData, text: impl Into<String>, markup: impl Into<String>) -> Self {
        Self::with_config(structured, text, markup, ValidatorConfig::default())
    }

    pub fn with_config(
        structured: PageData,
        text: impl Into<String>,
        markup: impl Into<String>,
        config: ValidatorConfig,
    ) -> Self {
        let text = text.into();
        let markup = markup.into();
        let structured_lower = serde_json::to_string(&structured)
            .unwrap_or_default()
            .to_lowercase();

        Self {
            structured,
            structured_lower,
            text_lower: text.to_lowercase(),
            text,
            markup_lower: markup.to_lowercase(),
            config,
        }
    }

    /// Validator over a full extraction result.
    pub fn for_page(page: &ExtractedPage) -> Self {
        Self::new(page.data.clone(), page.raw_text.clone(), page.markup.clone())
    }

    /// Case-insensitive exact lookup of `query` in the raw markup,
    /// answered with the raw-text sentence that contains it.
    ///
    /// This is the extraction-only path: no generative step, so the result
    /// can be served verbatim as a last-resort answer.
    pub fn literal_search(&self, query: &str) -> Option<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || !self.markup_lower.contains(&needle) {
            return None;
        }

        let sentence = self
            .text
            .split(['.', '!', '?'])
            .find(|sentence| sentence.to_lowercase().contains(&needle))?;

        tracing::debug!(query = %query, "literal search hit");
        Some(format!("{}.", sentence.trim()))
    }

    /// Number of sources containing at least one word of the answer.
    pub fn matched_sources(&self, answer: &str, sources: &[Source]) -> usize {
        let answer_lower = answer.to_lowercase();
        let words: Vec<&str> = answer_lower.split_whitespace().collect();
        if words.is_empty() {
            return 0;
        }

        sources
            .iter()
            .filter(|source| {
                let haystack = match source {
                    Source::Structured => &self.structured_lower,
                    Source::Text => &self.text_lower,
                    Source::Markup => &self.markup_lower,
                };
                words.iter().any(|word| haystack.contains(word))
            })
            .count()
    }

    /// An answer is corroborated when at least `min_sources` of the given
    /// sources contain one of its words.
    pub fn corroborate(&self, answer: &str, sources: &[Source]) -> bool {
        let matched = self.matched_sources(answer, sources);
        let valid = matched >= self.config.min_sources;
        tracing::debug!(matched, valid, "cross-source corroboration");
        valid
    }

    /// Numeric tokens must appear verbatim in the raw text, and benefit or
    /// guarantee claims require the corresponding structured field.
    pub fn anti_hallucination(&self, answer: &str) -> bool {
        for number in numeric_tokens(answer) {
            if !self.text.contains(&number) {
                tracing::warn!(
                    number = %number,
                    "rejected: answer cites a number absent from the source text"
                );
                return false;
            }
        }

        let answer_lower = answer.to_lowercase();
        if answer_lower.contains("benefício") && !self.structured.has_benefits() {
            tracing::warn!("rejected: answer mentions benefits, none in structured data");
            return false;
        }
        if answer_lower.contains("garantia") && !self.structured.has_guarantee() {
            tracing::warn!("rejected: answer mentions a guarantee, none in structured data");
            return false;
        }

        true
    }

    /// Full policy: corroboration across all three sources plus the
    /// anti-hallucination gate. Rejection routes the caller to a
    /// deterministic fallback.
    pub fn validate(&self, answer: &str) -> ValidationResult {
        let matched_sources = self.matched_sources(answer, &Source::ALL);
        let valid =
            matched_sources >= self.config.min_sources && self.anti_hallucination(answer);

        ValidationResult {
            valid,
            matched_sources,
            fallback: None,
        }
    }
}

/// Maximal runs of ASCII digits in `text`.
fn numeric_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
