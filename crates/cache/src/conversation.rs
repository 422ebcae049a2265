//! Bounded per-session conversation history

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;

use vitrine_core::{ChatMessage, ChatRole};

use crate::backend::CacheBackend;
use crate::{CacheStats, CacheStore, ConversationConfig};

/// Stored record for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Messages in submission order
    pub messages: Vec<ChatMessage>,
    /// When the session was first seen (Unix millis)
    pub created_at: i64,
    /// Last append time (Unix millis, so eviction ordering holds for
    /// sessions created within the same second)
    pub last_activity: i64,
}

impl ConversationRecord {
    fn empty(now_ms: i64) -> Self {
        Self {
            messages: Vec::new(),
            created_at: now_ms,
            last_activity: now_ms,
        }
    }
}

/// Append-only conversation log with bounded history, built on the cache
/// with its own namespace and a 24-hour default TTL.
///
/// Per-session appends are serialized through a keyed lock, so concurrent
/// requests for the same session cannot lose updates. When resident
/// sessions exceed the configured bound, the oldest by last activity are
/// evicted in a batch.
pub struct ConversationStore {
    store: CacheStore,
    config: ConversationConfig,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    /// Process-local activity index driving eviction order
    activity: Mutex<HashMap<String, i64>>,
}

impl ConversationStore {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self::with_config(backend, ConversationConfig::default())
    }

    pub fn with_config(backend: Arc<dyn CacheBackend>, config: ConversationConfig) -> Self {
        Self {
            store: CacheStore::new(backend, config.cache.clone()),
            config,
            locks: Mutex::new(HashMap::new()),
            activity: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, session_id: &str) -> Arc<AsyncMutex<()>> {
        self.locks
            .lock()
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    /// Append one message, truncating history to the configured bound.
    pub async fn append(
        &self,
        session_id: &str,
        role: ChatRole,
        content: impl Into<String>,
    ) -> bool {
        if session_id.trim().is_empty() {
            return false;
        }

        // read-modify-write must be atomic per session
        let lock = self.lock_for(session_id);
        let _guard = lock.lock().await;

        let now_ms = Utc::now().timestamp_millis();
        let mut record: ConversationRecord = self
            .store
            .get(session_id)
            .await
            .unwrap_or_else(|| ConversationRecord::empty(now_ms));

        record.messages.push(ChatMessage::new(role, content));
        if record.messages.len() > self.config.max_messages {
            let excess = record.messages.len() - self.config.max_messages;
            record.messages.drain(..excess);
        }
        record.last_activity = now_ms;

        if !self.store.set(session_id, &record).await {
            return false;
        }

        tracing::debug!(
            session = %session_id,
            messages = record.messages.len(),
            "appended message"
        );

        self.activity.lock().insert(session_id.to_string(), now_ms);
        self.evict_stale().await;
        true
    }

    /// Message history for a session, oldest first. Empty if absent.
    pub async fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        if session_id.trim().is_empty() {
            return Vec::new();
        }
        self.store
            .get::<ConversationRecord>(session_id)
            .await
            .map(|record| record.messages)
            .unwrap_or_default()
    }

    /// Drop a session's history, reporting whether one existed.
    pub async fn clear(&self, session_id: &str) -> bool {
        if session_id.trim().is_empty() {
            return false;
        }
        self.activity.lock().remove(session_id);
        self.locks.lock().remove(session_id);
        self.store.invalidate(session_id).await
    }

    /// Sessions with a live record in the namespace.
    ///
    /// Reads through the cache, so expired sessions are purged rather than
    /// reported. On a shared backend this sees sessions from every
    /// instance; in-process it is equivalent to the local index.
    pub async fn active_sessions(&self) -> Vec<String> {
        let mut sessions = Vec::new();
        for session_id in self.store.keys().await {
            if self
                .store
                .get::<ConversationRecord>(&session_id)
                .await
                .is_some()
            {
                sessions.push(session_id);
            }
        }
        sessions
    }

    pub async fn session_count(&self) -> usize {
        self.active_sessions().await.len()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.stats().await
    }

    /// Batch eviction: once the resident count exceeds `max_sessions`,
    /// remove the oldest by last activity down to `max_sessions -
    /// eviction_buffer`, amortizing the sort across future inserts.
    async fn evict_stale(&self) {
        let victims: Vec<String> = {
            let activity = self.activity.lock();
            if activity.len() <= self.config.max_sessions {
                return;
            }

            let target = self
                .config
                .max_sessions
                .saturating_sub(self.config.eviction_buffer);
            let remove = activity.len().saturating_sub(target);

            let mut sessions: Vec<(String, i64)> = activity
                .iter()
                .map(|(id, at)| (id.clone(), *at))
                .collect();
            sessions.sort_by_key(|(_, at)| *at);
            sessions.truncate(remove);
            sessions.into_iter().map(|(id, _)| id).collect()
        };

        for session_id in &victims {
            self.store.invalidate(session_id).await;
            self.activity.lock().remove(session_id);
            self.locks.lock().remove(session_id);
        }

        if !victims.is_empty() {
            tracing::info!(evicted = victims.len(), "evicted stale sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CacheConfig, MemoryBackend};
    use std::time::Duration;

    fn store() -> ConversationStore {
        ConversationStore::new(Arc::new(MemoryBackend::new()))
    }

    fn bounded(max_messages: usize) -> ConversationStore {
        ConversationStore::with_config(
            Arc::new(MemoryBackend::new()),
            ConversationConfig::default().with_max_messages(max_messages),
        )
    }

    #[tokio::test]
    async fn history_preserves_order() {
        let store = store();

        store.append("s1", ChatRole::User, "Olá!").await;
        store
            .append("s1", ChatRole::Assistant, "Oi! Como posso ajudar?")
            .await;
        store.append("s1", ChatRole::User, "Qual o preço?").await;

        let history = store.history("s1").await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[0].content, "Olá!");
        assert_eq!(history[2].content, "Qual o preço?");
    }

    #[tokio::test]
    async fn history_is_bounded_to_last_messages() {
        let store = bounded(5);

        for i in 0..8 {
            store
                .append("s1", ChatRole::User, format!("mensagem {i}"))
                .await;
        }

        let history = store.history("s1").await;
        assert_eq!(history.len(), 5);
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "mensagem 3",
                "mensagem 4",
                "mensagem 5",
                "mensagem 6",
                "mensagem 7"
            ]
        );
    }

    #[tokio::test]
    async fn absent_session_has_empty_history() {
        let store = store();
        assert!(store.history("nunca-vista").await.is_empty());
        assert!(store.history("").await.is_empty());
    }

    #[tokio::test]
    async fn clear_removes_session() {
        let store = store();

        store.append("s1", ChatRole::User, "Olá!").await;
        assert!(store.clear("s1").await);
        assert!(store.history("s1").await.is_empty());
        assert!(!store.clear("s1").await);
    }

    #[tokio::test]
    async fn empty_session_id_is_rejected() {
        let store = store();
        assert!(!store.append("", ChatRole::User, "Olá!").await);
        assert!(!store.append("   ", ChatRole::User, "Olá!").await);
    }

    #[tokio::test]
    async fn oldest_sessions_are_evicted_in_batches() {
        let store = ConversationStore::with_config(
            Arc::new(MemoryBackend::new()),
            ConversationConfig::default()
                .with_max_sessions(4)
                .with_eviction_buffer(2),
        );

        for i in 1..=5 {
            store
                .append(&format!("s{i}"), ChatRole::User, "Olá!")
                .await;
            // distinct last-activity millis so eviction order is stable
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // the fifth insert exceeded max_sessions and evicted the three
        // oldest, leaving max_sessions - eviction_buffer resident
        let mut active = store.active_sessions().await;
        active.sort();
        assert_eq!(active, vec!["s4".to_string(), "s5".to_string()]);

        assert!(store.history("s1").await.is_empty());
        assert!(store.history("s2").await.is_empty());
        assert_eq!(store.history("s4").await.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_appends_to_one_session_are_not_lost() {
        let store = Arc::new(store());

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append("s1", ChatRole::User, format!("mensagem {i}"))
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(store.history("s1").await.len(), 10);
    }

    #[tokio::test]
    async fn active_sessions_skips_expired_records() {
        let store = ConversationStore::with_config(
            Arc::new(MemoryBackend::new()),
            ConversationConfig {
                cache: CacheConfig::conversation().with_ttl(Duration::from_secs(1)),
                ..Default::default()
            },
        );

        store.append("s1", ChatRole::User, "Olá!").await;
        assert_eq!(store.session_count().await, 1);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(store.session_count().await, 0);
    }
}
