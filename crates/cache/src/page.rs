//! Typed cache for extracted page data

use std::sync::Arc;

use vitrine_core::ExtractedPage;

use crate::backend::CacheBackend;
use crate::{CacheConfig, CacheStats, CacheStore, Fingerprint};

/// Cache for extraction results, keyed by URL fingerprint.
///
/// Carries the page-data namespace and its longer TTL; the payload itself
/// is opaque to the store.
pub struct PageCache {
    store: CacheStore,
}

impl PageCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self::with_config(backend, CacheConfig::page_data())
    }

    pub fn with_config(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self {
            store: CacheStore::new(backend, config),
        }
    }

    /// Cached extraction result for a URL, if present and unexpired.
    pub async fn get(&self, url: &str) -> Option<ExtractedPage> {
        if url.trim().is_empty() {
            return None;
        }
        self.store.get(&Fingerprint::of(url)).await
    }

    /// Cache the extraction result for a URL.
    pub async fn set(&self, url: &str, page: &ExtractedPage) -> bool {
        if url.trim().is_empty() {
            return false;
        }
        self.store.set(&Fingerprint::of(url), page).await
    }

    /// Drop the cached result for a URL.
    pub async fn invalidate(&self, url: &str) -> bool {
        if url.trim().is_empty() {
            return false;
        }
        self.store.invalidate(&Fingerprint::of(url)).await
    }

    /// Remove everything in the page namespace.
    pub async fn clear(&self) -> usize {
        self.store.clear().await
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;
    use vitrine_core::PageData;

    fn sample_page() -> ExtractedPage {
        ExtractedPage {
            data: PageData {
                url: "https://exemplo.com/produto".into(),
                title: "Curso de Teste".into(),
                price: "R$ 100".into(),
                ..Default::default()
            },
            raw_text: "Curso de Teste. Preço: R$ 100.".into(),
            markup: "<h1>Curso de Teste</h1>".into(),
        }
    }

    #[tokio::test]
    async fn page_roundtrip_by_url() {
        let cache = PageCache::new(Arc::new(MemoryBackend::new()));
        let page = sample_page();

        assert!(cache.set("https://exemplo.com/produto", &page).await);

        let hit = cache.get("https://exemplo.com/produto").await.unwrap();
        assert_eq!(hit.data.title, "Curso de Teste");

        assert!(cache.get("https://exemplo.com/outro").await.is_none());
    }

    #[tokio::test]
    async fn invalidate_removes_page() {
        let cache = PageCache::new(Arc::new(MemoryBackend::new()));
        let page = sample_page();

        cache.set("https://exemplo.com/produto", &page).await;
        assert!(cache.invalidate("https://exemplo.com/produto").await);
        assert!(cache.get("https://exemplo.com/produto").await.is_none());
    }

    #[tokio::test]
    async fn blank_url_is_rejected() {
        let cache = PageCache::new(Arc::new(MemoryBackend::new()));
        assert!(!cache.set("  ", &sample_page()).await);
        assert!(cache.get("").await.is_none());
    }
}
