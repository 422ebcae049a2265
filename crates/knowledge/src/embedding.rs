//! Pluggable embedding seam
//!
//! The index ranks by token overlap; this trait only exists so a real
//! embedding model can be substituted later without touching the search
//! or ranking logic. The bundled implementation is a placeholder, not a
//! semantic embedding.

use async_trait::async_trait;

/// Produces a vector representation of a text.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Vec<f32>;

    /// Dimension of the produced vectors.
    fn dimension(&self) -> usize;
}

/// Placeholder embedder: a unit-norm pseudo-vector seeded from a hash of
/// the text. The same text always yields the same vector, which is all
/// this guarantees; there is nothing semantic about the geometry.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(768)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Vec<f32> {
        // FNV-1a accumulation keeps the seed stable across runs
        let seed = text.bytes().fold(0xcbf2_9ce4_8422_2325u64, |acc, b| {
            (acc ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
        });

        let mut state = seed.max(1);
        let mut embedding = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            embedding.push((state % 2000) as f32 / 1000.0 - 1.0);
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity between two vectors, 0.0 when shapes differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_same_vector() {
        let embedder = HashEmbedder::new(64);

        let a = embedder.embed("Qual o preço do curso?").await;
        let b = embedder.embed("Qual o preço do curso?").await;
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn different_texts_differ() {
        let embedder = HashEmbedder::new(64);

        let a = embedder.embed("curso de marketing").await;
        let b = embedder.embed("ebook de vendas").await;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn vectors_are_unit_norm() {
        let embedder = HashEmbedder::default();
        assert_eq!(embedder.dimension(), 768);

        let v = embedder.embed("texto qualquer").await;
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn cosine_of_identical_vectors_is_one() {
        let embedder = HashEmbedder::new(32);
        let v = embedder.embed("texto").await;

        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-5);
        assert_eq!(cosine_similarity(&v, &v[..16]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
