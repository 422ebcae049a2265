//! Backing-store abstraction
//!
//! The store speaks to a small keyed interface with a liveness probe, so
//! the in-process map and a shared Redis/Valkey instance are
//! interchangeable and the degradation logic is written once.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::CacheError;

/// Interface to a backing key-value store.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Cheap liveness probe.
    async fn ping(&self) -> bool;

    /// Fetch the raw serialized entry for a key.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a raw serialized entry. `ttl` is honored natively by backends
    /// that support expiry; the envelope enforces it everywhere else.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a key, reporting whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Enumerate keys under a prefix.
    async fn scan_keys(&self, prefix: &str) -> Result<Vec<String>, CacheError>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// In-process backing store.
///
/// Has no native expiry: entries stay resident until a get, purge or clear
/// touches them, which keeps expired entries countable by `stats()`.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entry count, valid or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn ping(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String, _ttl: Duration) -> Result<(), CacheError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().remove(key).is_some())
    }

    async fn scan_keys(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_roundtrip() {
        let backend = MemoryBackend::new();

        backend
            .set("a", "1".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(backend.get("a").await.unwrap(), Some("1".to_string()));
        assert_eq!(backend.get("b").await.unwrap(), None);

        assert!(backend.delete("a").await.unwrap());
        assert!(!backend.delete("a").await.unwrap());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn memory_backend_scan_is_prefix_scoped() {
        let backend = MemoryBackend::new();
        let ttl = Duration::from_secs(60);

        backend.set("page:a", "1".into(), ttl).await.unwrap();
        backend.set("page:b", "2".into(), ttl).await.unwrap();
        backend.set("conv:c", "3".into(), ttl).await.unwrap();

        let keys = backend.scan_keys("page:").await.unwrap();
        assert_eq!(keys, vec!["page:a".to_string(), "page:b".to_string()]);
    }
}
