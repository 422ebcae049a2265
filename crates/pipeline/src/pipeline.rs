//! End-to-end calling policy for one chat exchange

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use vitrine_cache::{CacheBackend, CacheStats, ConversationStore, PageCache};
use vitrine_core::{ChatRole, ExtractedPage};
use vitrine_knowledge::SimilarityIndex;
use vitrine_validator::{template_reply, ResponseValidator, ValidationResult};

use crate::error::PipelineError;
use crate::traits::{PageExtractor, ResponseDrafter};

/// Tunables for the pipeline.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Length budget for retrieved context
    pub context_max_len: usize,
    /// Most recent messages handed to the drafter
    pub history_window: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context_max_len: 1000,
            history_window: 10,
        }
    }
}

/// One answered exchange.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    /// Reply delivered to the user
    pub reply: String,
    /// Validation outcome of the draft, absent when generation was
    /// unavailable
    pub validation: Option<ValidationResult>,
    /// Whether the reply came from the deterministic fallback path
    pub from_fallback: bool,
}

/// Aggregate stats surface for the calling layer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub pages: CacheStats,
    pub conversations: CacheStats,
    pub active_sessions: usize,
    pub indexed_documents: usize,
}

/// Response-integrity pipeline: cache, retrieval, generation seam,
/// validation and history, explicitly wired together.
///
/// All state is injected at construction; there are no process-wide
/// singletons. The stores share one backing store but keep disjoint
/// namespaces.
pub struct ChatPipeline {
    extractor: Arc<dyn PageExtractor>,
    drafter: Arc<dyn ResponseDrafter>,
    pages: PageCache,
    conversations: ConversationStore,
    index: SimilarityIndex,
    config: PipelineConfig,
}

impl ChatPipeline {
    pub fn new(
        extractor: Arc<dyn PageExtractor>,
        drafter: Arc<dyn ResponseDrafter>,
        backend: Arc<dyn CacheBackend>,
    ) -> Self {
        Self::with_config(extractor, drafter, backend, PipelineConfig::default())
    }

    pub fn with_config(
        extractor: Arc<dyn PageExtractor>,
        drafter: Arc<dyn ResponseDrafter>,
        backend: Arc<dyn CacheBackend>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            extractor,
            drafter,
            pages: PageCache::new(backend.clone()),
            conversations: ConversationStore::new(backend),
            index: SimilarityIndex::new(),
            config,
        }
    }

    /// Page data for a URL, served from cache when possible and indexed
    /// for retrieval either way.
    pub async fn load_page(&self, url: &str) -> Result<ExtractedPage, PipelineError> {
        if url.trim().is_empty() {
            return Err(PipelineError::MissingUrl);
        }

        let page = match self.pages.get(url).await {
            Some(page) => {
                tracing::info!(url = %url, "page data served from cache");
                page
            }
            None => {
                tracing::info!(url = %url, "extracting page data");
                let page = self.extractor.extract(url).await?;
                self.pages.set(url, &page).await;
                page
            }
        };

        // the index is process-local and rebuilt on restart, so a cache
        // hit may still need indexing
        if self.index.find_by_url(&page.data.url).is_none() {
            self.index
                .add_document(page.data.clone(), page.raw_text.clone());
        }

        Ok(page)
    }

    /// Answer one user question for a session.
    pub async fn answer(
        &self,
        session_id: &str,
        url: &str,
        question: &str,
    ) -> Result<ChatExchange, PipelineError> {
        if session_id.trim().is_empty() {
            return Err(PipelineError::MissingSession);
        }
        if question.trim().is_empty() {
            return Err(PipelineError::MissingQuestion);
        }

        let page = self.load_page(url).await?;
        let history = self.conversations.history(session_id).await;
        let context = self
            .index
            .context_for(question, self.config.context_max_len);
        let validator = ResponseValidator::for_page(&page);

        let window_start = history.len().saturating_sub(self.config.history_window);
        let draft = self
            .drafter
            .draft(question, &context, &history[window_start..])
            .await;

        let exchange = match draft {
            Some(answer) => {
                let mut validation = validator.validate(&answer);
                if validation.valid {
                    ChatExchange {
                        reply: answer,
                        validation: Some(validation),
                        from_fallback: false,
                    }
                } else {
                    tracing::warn!(
                        matched = validation.matched_sources,
                        "draft rejected, substituting deterministic fallback"
                    );
                    let fallback = self.fallback_reply(&validator, question, &page);
                    validation.fallback = Some(fallback.clone());
                    ChatExchange {
                        reply: fallback,
                        validation: Some(validation),
                        from_fallback: true,
                    }
                }
            }
            None => {
                tracing::warn!("generation unavailable, using deterministic fallback");
                ChatExchange {
                    reply: self.fallback_reply(&validator, question, &page),
                    validation: None,
                    from_fallback: true,
                }
            }
        };

        self.conversations
            .append(session_id, ChatRole::User, question)
            .await;
        self.conversations
            .append(session_id, ChatRole::Assistant, &exchange.reply)
            .await;

        Ok(exchange)
    }

    /// Deterministic reply: a literal-search hit when the question appears
    /// verbatim in the page, else a template built from structured fields.
    fn fallback_reply(
        &self,
        validator: &ResponseValidator,
        question: &str,
        page: &ExtractedPage,
    ) -> String {
        validator
            .literal_search(question)
            .unwrap_or_else(|| template_reply(question, &page.data))
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn pages(&self) -> &PageCache {
        &self.pages
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    /// Entry counts and session count across both namespaces.
    pub async fn stats(&self) -> PipelineStats {
        PipelineStats {
            pages: self.pages.stats().await,
            conversations: self.conversations.stats().await,
            active_sessions: self.conversations.session_count().await,
            indexed_documents: self.index.len(),
        }
    }
}
