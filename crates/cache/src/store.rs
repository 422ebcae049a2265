//! Namespaced TTL cache over an abstract backing store

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::time::timeout;

use crate::backend::CacheBackend;
use crate::{CacheConfig, CacheEntry, CacheStats};

/// Deterministic cache key derived from a resource identity.
pub struct Fingerprint;

impl Fingerprint {
    /// SHA-256 hex digest of the canonical identity string.
    ///
    /// Identical identities always map to the same key; distinct
    /// identities do not collide in practice.
    pub fn of(identity: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(identity.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// TTL key-value cache bound to one namespace of a backing store.
///
/// Every operation degrades to the miss/false outcome when the backing
/// store is unreachable or slow: before touching the backend the store
/// runs a liveness probe under a short timeout, retries it once, and on
/// repeated failure turns the operation into a safe no-op. Callers never
/// see a backend error.
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    config: CacheConfig,
    degraded: AtomicBool,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self {
            backend,
            config,
            degraded: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }

    async fn probe(&self) -> bool {
        timeout(self.config.probe_timeout, self.backend.ping())
            .await
            .unwrap_or(false)
    }

    /// Liveness check with one reconnect attempt. Transitions in and out
    /// of the degraded state are logged once, not per operation.
    async fn is_available(&self) -> bool {
        if self.probe().await || self.probe().await {
            if self.degraded.swap(false, Ordering::Relaxed) {
                tracing::info!(backend = self.backend.name(), "backing store reachable again");
            }
            return true;
        }

        if !self.degraded.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                backend = self.backend.name(),
                "backing store unreachable, cache degraded to no-op"
            );
        }
        false
    }

    /// Read a value, purging it first if it has expired.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if key.is_empty() || !self.is_available().await {
            return None;
        }

        let full_key = self.namespaced(key);
        let raw = match timeout(self.config.op_timeout, self.backend.get(&full_key)).await {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => {
                tracing::debug!(key = %key, "cache MISS");
                return None;
            }
            Ok(Err(e)) => {
                tracing::warn!(key = %key, error = %e, "cache read failed");
                return None;
            }
            Err(_) => {
                tracing::warn!(key = %key, "cache read timed out");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry");
                let _ = timeout(self.config.op_timeout, self.backend.delete(&full_key)).await;
                return None;
            }
        };

        if entry.is_expired() {
            // expired entries are removed on touch
            let _ = timeout(self.config.op_timeout, self.backend.delete(&full_key)).await;
            tracing::debug!(key = %key, age_secs = entry.age_secs(), "cache EXPIRED");
            return None;
        }

        tracing::debug!(key = %key, "cache HIT");
        Some(entry.value)
    }

    /// Store a value under the namespace default TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> bool {
        self.set_with_ttl(key, value, self.config.default_ttl).await
    }

    /// Store a value with an explicit TTL, overwriting any prior entry.
    pub async fn set_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        if key.is_empty() || !self.is_available().await {
            return false;
        }

        let entry = CacheEntry::new(key, value, ttl);
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache entry not serializable");
                return false;
            }
        };

        let full_key = self.namespaced(key);
        match timeout(self.config.op_timeout, self.backend.set(&full_key, raw, ttl)).await {
            Ok(Ok(())) => {
                tracing::debug!(key = %key, ttl_secs = ttl.as_secs(), "cache STORE");
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(key = %key, error = %e, "cache write failed");
                false
            }
            Err(_) => {
                tracing::warn!(key = %key, "cache write timed out");
                false
            }
        }
    }

    /// Remove one entry, reporting whether it existed.
    pub async fn invalidate(&self, key: &str) -> bool {
        if key.is_empty() || !self.is_available().await {
            return false;
        }

        let full_key = self.namespaced(key);
        match timeout(self.config.op_timeout, self.backend.delete(&full_key)).await {
            Ok(Ok(removed)) => removed,
            _ => false,
        }
    }

    /// Remove every entry in this namespace, returning the count removed.
    pub async fn clear(&self) -> usize {
        let mut removed = 0;
        for key in self.scan_namespace().await {
            if let Ok(Ok(true)) =
                timeout(self.config.op_timeout, self.backend.delete(&key)).await
            {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(prefix = %self.config.key_prefix, removed, "cache cleared");
        }
        removed
    }

    /// Entry counts for this namespace.
    pub async fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for key in self.scan_namespace().await {
            let raw = match timeout(self.config.op_timeout, self.backend.get(&key)).await {
                Ok(Ok(Some(raw))) => raw,
                _ => continue,
            };
            let entry: CacheEntry<serde_json::Value> = match serde_json::from_str(&raw) {
                Ok(entry) => entry,
                Err(_) => continue,
            };
            stats.total_entries += 1;
            if entry.is_expired() {
                stats.expired_entries += 1;
            } else {
                stats.valid_entries += 1;
            }
        }
        stats
    }

    /// Sweep expired entries out of the namespace.
    ///
    /// Safe to run concurrently with reads and writes: expiry is monotonic,
    /// so this only removes entries a concurrent `get` would purge anyway.
    pub async fn purge_expired(&self) -> usize {
        let mut purged = 0;
        for key in self.scan_namespace().await {
            let raw = match timeout(self.config.op_timeout, self.backend.get(&key)).await {
                Ok(Ok(Some(raw))) => raw,
                _ => continue,
            };
            let expired = serde_json::from_str::<CacheEntry<serde_json::Value>>(&raw)
                .map(|entry| entry.is_expired())
                .unwrap_or(true);
            if expired
                && matches!(
                    timeout(self.config.op_timeout, self.backend.delete(&key)).await,
                    Ok(Ok(true))
                )
            {
                purged += 1;
            }
        }
        if purged > 0 {
            tracing::info!(prefix = %self.config.key_prefix, purged, "purged expired entries");
        }
        purged
    }

    /// Namespace-relative keys currently present in the backend.
    pub async fn keys(&self) -> Vec<String> {
        self.scan_namespace()
            .await
            .into_iter()
            .map(|k| k[self.config.key_prefix.len()..].to_string())
            .collect()
    }

    async fn scan_namespace(&self) -> Vec<String> {
        if !self.is_available().await {
            return Vec::new();
        }
        match timeout(
            self.config.op_timeout,
            self.backend.scan_keys(&self.config.key_prefix),
        )
        .await
        {
            Ok(Ok(keys)) => keys,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "namespace scan failed");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("namespace scan timed out");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CacheError, MemoryBackend};
    use async_trait::async_trait;

    fn store_with(config: CacheConfig) -> (Arc<MemoryBackend>, CacheStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = CacheStore::new(backend.clone(), config);
        (backend, store)
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = Fingerprint::of("https://exemplo.com/produto");
        let b = Fingerprint::of("https://exemplo.com/produto");
        let c = Fingerprint::of("https://exemplo.com/outro");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn get_after_set_returns_value() {
        let (_, store) = store_with(CacheConfig::default());

        assert!(store.set("k", &"valor".to_string()).await);
        let hit: Option<String> = store.get("k").await;
        assert_eq!(hit, Some("valor".to_string()));

        let miss: Option<String> = store.get("outro").await;
        assert_eq!(miss, None);
    }

    #[tokio::test]
    async fn set_overwrites_prior_entry() {
        let (_, store) = store_with(CacheConfig::default());

        store.set("k", &1u32).await;
        store.set("k", &2u32).await;

        assert_eq!(store.get::<u32>("k").await, Some(2));
    }

    #[tokio::test]
    async fn expired_entry_is_purged_on_get() {
        let (backend, store) = store_with(CacheConfig::default());

        store
            .set_with_ttl("k", &"valor".to_string(), Duration::from_secs(1))
            .await;
        assert!(store.get::<String>("k").await.is_some());

        // expiry is second-granular and strict, so wait past the boundary
        tokio::time::sleep(Duration::from_millis(2100)).await;

        assert_eq!(store.get::<String>("k").await, None);
        // physically removed, not just hidden
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn stats_classify_entries_by_expiry() {
        let (_, store) = store_with(CacheConfig::default());

        store.set("fresh", &1u32).await;
        store
            .set_with_ttl("stale", &2u32, Duration::from_secs(0))
            .await;

        let stats = store.stats().await;
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.expired_entries, 1);

        // after the sweep only the fresh entry remains
        assert_eq!(store.purge_expired().await, 1);
        let stats = store.stats().await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expired_entries, 0);
    }

    #[tokio::test]
    async fn invalidate_reports_presence() {
        let (_, store) = store_with(CacheConfig::default());

        store.set("k", &1u32).await;
        assert!(store.invalidate("k").await);
        assert!(!store.invalidate("k").await);
    }

    #[tokio::test]
    async fn clear_only_touches_own_namespace() {
        let backend = Arc::new(MemoryBackend::new());
        let pages = CacheStore::new(backend.clone(), CacheConfig::page_data());
        let convs = CacheStore::new(backend.clone(), CacheConfig::conversation());

        pages.set("p1", &1u32).await;
        pages.set("p2", &2u32).await;
        convs.set("c1", &3u32).await;

        assert_eq!(pages.clear().await, 2);
        assert_eq!(convs.get::<u32>("c1").await, Some(3));
    }

    #[tokio::test]
    async fn empty_key_is_a_noop() {
        let (_, store) = store_with(CacheConfig::default());

        assert!(!store.set("", &1u32).await);
        assert_eq!(store.get::<u32>("").await, None);
        assert!(!store.invalidate("").await);
    }

    /// Backend that refuses its liveness probe.
    struct DownBackend;

    #[async_trait]
    impl CacheBackend for DownBackend {
        async fn ping(&self) -> bool {
            false
        }
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Connection("down".into()))
        }
        async fn set(
            &self,
            _key: &str,
            _value: String,
            _ttl: Duration,
        ) -> Result<(), CacheError> {
            Err(CacheError::Connection("down".into()))
        }
        async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
            Err(CacheError::Connection("down".into()))
        }
        async fn scan_keys(&self, _prefix: &str) -> Result<Vec<String>, CacheError> {
            Err(CacheError::Connection("down".into()))
        }
        fn name(&self) -> &'static str {
            "down"
        }
    }

    #[tokio::test]
    async fn unreachable_backend_degrades_to_noop() {
        let store = CacheStore::new(Arc::new(DownBackend), CacheConfig::default());

        assert!(!store.set("k", &1u32).await);
        assert_eq!(store.get::<u32>("k").await, None);
        assert!(!store.invalidate("k").await);
        assert_eq!(store.clear().await, 0);

        let stats = store.stats().await;
        assert_eq!(stats.total_entries, 0);
    }
}
