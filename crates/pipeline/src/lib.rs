//! Response-integrity pipeline for vitrine
//!
//! Wires the stores, the retrieval index and the validator into one
//! calling policy for a chat exchange:
//!
//! 1. page data is served from cache or fetched through the extraction
//!    collaborator and indexed
//! 2. the generation collaborator drafts an answer from retrieved context
//!    and conversation history
//! 3. the draft is validated against the page sources; rejected or
//!    missing drafts are replaced by a deterministic fallback
//! 4. the exchange is appended to the session history
//!
//! Extraction and generation stay behind the [`PageExtractor`] and
//! [`ResponseDrafter`] traits; only mocks live in this workspace.

mod error;
mod mock;
mod pipeline;
mod traits;

pub use error::PipelineError;
pub use mock::{MockDrafter, MockExtractor};
pub use pipeline::{ChatExchange, ChatPipeline, PipelineConfig, PipelineStats};
pub use traits::{ExtractError, PageExtractor, ResponseDrafter};
