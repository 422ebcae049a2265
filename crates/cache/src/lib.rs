//! TTL cache and conversation store for vitrine
//!
//! Backs the response-integrity pipeline with two namespaced stores over a
//! shared backing store:
//!
//! - **PageCache**: extracted page data keyed by URL fingerprint
//! - **ConversationStore**: bounded per-session message history
//!
//! Both are built on [`CacheStore`], a TTL key-value cache over the
//! [`CacheBackend`] abstraction. Backends:
//!
//! - **In-Memory** (default): process-local map
//! - **Redis/Valkey** (`redis` feature): shared store for multi-instance
//!   deployments
//!
//! The central failure contract: the cache is never a single point of
//! failure. When the backing store is unreachable, reads return misses and
//! writes report failure; no error reaches the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vitrine_cache::{CacheConfig, CacheStore, MemoryBackend};
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let cache = CacheStore::new(backend, CacheConfig::page_data());
//!
//! cache.set("key", &payload).await;
//! let hit: Option<Payload> = cache.get("key").await;
//! ```

mod backend;
mod config;
mod conversation;
mod entry;
mod error;
mod page;
mod store;

#[cfg(feature = "redis")]
mod redis_backend;

pub use backend::{CacheBackend, MemoryBackend};
pub use config::{CacheConfig, ConversationConfig};
pub use conversation::{ConversationRecord, ConversationStore};
pub use entry::{CacheEntry, CacheStats};
pub use error::CacheError;
pub use page::PageCache;
pub use store::{CacheStore, Fingerprint};

#[cfg(feature = "redis")]
pub use redis_backend::RedisBackend;
