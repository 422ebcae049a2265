//! Cache configuration

use std::time::Duration;

/// Configuration for one namespaced cache store.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Key prefix isolating this store's namespace in a shared backend
    pub key_prefix: String,
    /// Default time-to-live for entries
    pub default_ttl: Duration,
    /// Timeout for the liveness probe
    pub probe_timeout: Duration,
    /// Timeout for each backend operation
    pub op_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: "vitrine:cache:".to_string(),
            default_ttl: Duration::from_secs(3600),
            probe_timeout: Duration::from_secs(2),
            op_timeout: Duration::from_secs(5),
        }
    }
}

impl CacheConfig {
    /// Config for extracted page data (2 hours)
    pub fn page_data() -> Self {
        Self {
            key_prefix: "vitrine:page:".to_string(),
            default_ttl: Duration::from_secs(7200),
            ..Default::default()
        }
    }

    /// Config for conversation history (24 hours)
    pub fn conversation() -> Self {
        Self {
            key_prefix: "vitrine:conversation:".to_string(),
            default_ttl: Duration::from_secs(86400),
            ..Default::default()
        }
    }

    /// Set the key prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the default TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the per-operation timeout
    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }
}

/// Configuration for the bounded conversation store.
#[derive(Clone, Debug)]
pub struct ConversationConfig {
    /// Store config (namespace + TTL)
    pub cache: CacheConfig,
    /// Maximum messages kept per session; oldest dropped first
    pub max_messages: usize,
    /// Maximum resident sessions before eviction runs
    pub max_sessions: usize,
    /// Extra sessions removed per eviction batch, amortizing its cost
    pub eviction_buffer: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::conversation(),
            max_messages: 50,
            max_sessions: 100,
            eviction_buffer: 10,
        }
    }
}

impl ConversationConfig {
    pub fn with_max_messages(mut self, max: usize) -> Self {
        self.max_messages = max;
        self
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    pub fn with_eviction_buffer(mut self, buffer: usize) -> Self {
        self.eviction_buffer = buffer;
        self
    }
}
