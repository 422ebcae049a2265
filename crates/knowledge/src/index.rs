//! Token-overlap document index

use std::collections::HashSet;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use vitrine_core::PageData;

/// Configuration for the similarity index.
#[derive(Clone, Debug)]
pub struct IndexConfig {
    /// Scores at or below this value are excluded from results
    pub min_score: f32,
    /// Documents considered when assembling context
    pub context_top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            min_score: 0.1,
            context_top_k: 2,
        }
    }
}

impl IndexConfig {
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }
}

/// A document owned by the index. Immutable once inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Monotonic id assigned on insert
    pub id: u64,
    /// Structured fields of the source page
    pub metadata: PageData,
    /// Full text of the source page
    pub raw_text: String,
}

/// A matched document with its overlap score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document: DocumentRecord,
    /// Jaccard similarity in [0, 1]
    pub score: f32,
}

/// In-memory document collection scored by Jaccard overlap of lower-cased
/// word sets.
///
/// Append-only and process-local; rebuilt from scratch on restart.
#[derive(Default)]
pub struct SimilarityIndex {
    documents: RwLock<Vec<DocumentRecord>>,
    config: IndexConfig,
}

impl SimilarityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Insert a document, assigning the next monotonic id. Never rejects.
    pub fn add_document(&self, metadata: PageData, raw_text: impl Into<String>) -> u64 {
        let mut documents = self.documents.write();
        let id = documents.len() as u64;
        tracing::debug!(id, title = %metadata.title, "indexed document");
        documents.push(DocumentRecord {
            id,
            metadata,
            raw_text: raw_text.into(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Id of the first document indexed for `url`, if any.
    pub fn find_by_url(&self, url: &str) -> Option<u64> {
        self.documents
            .read()
            .iter()
            .find(|doc| doc.metadata.url == url)
            .map(|doc| doc.id)
    }

    /// Top-`top_k` documents by token overlap with `query`.
    ///
    /// Scores at or below the configured threshold are dropped; ties keep
    /// insertion order (lower id first). An empty query matches nothing.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let documents = self.documents.read();
        let mut results: Vec<SearchResult> = documents
            .iter()
            .map(|doc| SearchResult {
                score: jaccard(&query_tokens, &tokenize(&searchable_text(doc))),
                document: doc.clone(),
            })
            .filter(|result| result.score > self.config.min_score)
            .collect();

        // stable sort keeps insertion order within equal scores
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        tracing::debug!(query = %query, results = results.len(), "similarity search");
        results
    }

    /// Context for a prompt: the top matches rendered as structured blocks
    /// and concatenated in score order while they fit in `max_len`.
    /// Blocks are included whole or not at all.
    pub fn context_for(&self, query: &str, max_len: usize) -> String {
        let matches = self.search(query, self.config.context_top_k);
        if matches.is_empty() {
            return String::new();
        }

        let mut blocks = Vec::new();
        let mut used = 0;
        for result in &matches {
            let block = render_block(&result.document.metadata);
            if used + block.len() > max_len {
                break;
            }
            used += block.len();
            blocks.push(block);
        }

        blocks.join("\n")
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f32 / union as f32
}

/// Fields a query is matched against: title, description, benefits and
/// the raw page text.
fn searchable_text(doc: &DocumentRecord) -> String {
    format!(
        "{} {} {} {}",
        doc.metadata.title,
        doc.metadata.description,
        doc.metadata.benefits.join(" "),
        doc.raw_text
    )
}

fn render_block(metadata: &PageData) -> String {
    let mut block = format!("Produto: {}\n", field_or_na(&metadata.title));
    block.push_str(&format!("Preço: {}\n", field_or_na(&metadata.price)));

    if !metadata.benefits.is_empty() {
        let shown: Vec<&str> = metadata
            .benefits
            .iter()
            .take(3)
            .map(String::as_str)
            .collect();
        block.push_str(&format!("Benefícios: {}\n", shown.join(", ")));
    }

    if !metadata.description.is_empty() {
        let head: String = metadata.description.chars().take(200).collect();
        block.push_str(&format!("Descrição: {head}...\n"));
    }

    block.push('\n');
    block
}

fn field_or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}
