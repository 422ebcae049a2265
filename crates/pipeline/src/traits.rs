//! Collaborator seams
//!
//! Page extraction and response generation are external services; the
//! pipeline depends only on these traits.

use async_trait::async_trait;
use thiserror::Error;

use vitrine_core::{ChatMessage, ExtractedPage};

/// Errors from the extraction collaborator.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("unparseable page: {0}")]
    Parse(String),
}

/// Fetches a sales page and parses its structured record.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ExtractedPage, ExtractError>;
}

/// Drafts a candidate answer from the question, retrieved context and
/// recent history. `None` means generation is unavailable; the pipeline
/// then falls back to deterministic replies.
#[async_trait]
pub trait ResponseDrafter: Send + Sync {
    async fn draft(
        &self,
        question: &str,
        context: &str,
        history: &[ChatMessage],
    ) -> Option<String>;
}
