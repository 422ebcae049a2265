//! Pipeline error types

use thiserror::Error;

use crate::traits::ExtractError;

/// Errors surfaced to the calling layer.
///
/// Cache and index failures never appear here; they degrade to misses and
/// fallback answers inside the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("url must not be empty")]
    MissingUrl,

    #[error("question must not be empty")]
    MissingQuestion,

    #[error("session id must not be empty")]
    MissingSession,

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractError),
}
