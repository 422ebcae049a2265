//! Data types shared across the pipeline

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Structured record extracted from a sales page.
///
/// Produced by the extraction collaborator. The cache treats it as an
/// opaque payload; the knowledge index and the validator read its fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    /// Canonical page URL
    pub url: String,
    /// Product or page title
    pub title: String,
    /// Short product description
    pub description: String,
    /// Price as displayed on the page (e.g. "R$ 697,00")
    pub price: String,
    /// Listed benefits
    pub benefits: Vec<String>,
    /// Call-to-action label
    pub cta: String,
    /// Guarantee wording, empty when the page offers none
    pub guarantee: String,
    /// Target audience description
    pub target_audience: String,
    /// Testimonial snippets
    pub testimonials: Vec<String>,
    /// Product type (course, ebook, ...)
    pub product_type: String,
}

impl PageData {
    pub fn has_benefits(&self) -> bool {
        !self.benefits.is_empty()
    }

    pub fn has_guarantee(&self) -> bool {
        !self.guarantee.trim().is_empty()
    }
}

/// Full extraction result for one page: the structured record plus the
/// raw sources the validator cross-checks answers against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedPage {
    /// Parsed structured fields
    pub data: PageData,
    /// Main text extracted from the page
    pub raw_text: String,
    /// Original markup, used for literal re-search
    pub markup: String,
}

/// Role of a message sender in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the sender
    pub role: ChatRole,
    /// Message content
    pub content: String,
    /// When the message was created (Unix timestamp)
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");

        let role: ChatRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, ChatRole::User);
    }

    #[test]
    fn page_data_roundtrip() {
        let data = PageData {
            url: "https://exemplo.com/produto".into(),
            title: "Curso de Teste".into(),
            price: "R$ 100".into(),
            benefits: vec!["Acesso vitalício".into()],
            guarantee: "7 dias".into(),
            ..Default::default()
        };

        let json = serde_json::to_string(&data).unwrap();
        let back: PageData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
        assert!(back.has_guarantee());
        assert!(back.has_benefits());
    }

    #[test]
    fn guarantee_whitespace_is_empty() {
        let data = PageData {
            guarantee: "   ".into(),
            ..Default::default()
        };
        assert!(!data.has_guarantee());
    }
}
