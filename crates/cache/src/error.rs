//! Cache error types

use thiserror::Error;

/// Errors raised by cache backends.
///
/// These never escape the store API: the store logs them and degrades to
/// the miss/false outcome per the availability contract.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),

    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl CacheError {
    /// Whether the error indicates an unreachable backing store.
    pub fn is_connection(&self) -> bool {
        match self {
            CacheError::Connection(_) => true,
            #[cfg(feature = "redis")]
            CacheError::Redis(e) => e.is_connection_refusal() || e.is_timeout(),
            _ => false,
        }
    }
}
