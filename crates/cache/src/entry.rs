//! Cache entry envelope and statistics

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Envelope written for every cache entry.
///
/// Carries the creation timestamp and TTL alongside the value so that
/// expiry can be decided uniformly, including on backends with no native
/// TTL support.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Namespace-relative key the entry was stored under
    pub key: String,
    /// The cached payload
    pub value: T,
    /// When the entry was created (Unix timestamp)
    pub created_at: i64,
    /// Time-to-live in seconds
    pub ttl_secs: u64,
}

impl<T> CacheEntry<T> {
    pub fn new(key: impl Into<String>, value: T, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            value,
            created_at: Utc::now().timestamp(),
            ttl_secs: ttl.as_secs(),
        }
    }

    /// An entry is readable only while its age is strictly below the TTL.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now - self.created_at >= self.ttl_secs as i64
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Age in seconds
    pub fn age_secs(&self) -> i64 {
        Utc::now().timestamp() - self.created_at
    }
}

/// Entry counts for one cache namespace.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Entries physically present in the namespace
    pub total_entries: usize,
    /// Entries still within their TTL
    pub valid_entries: usize,
    /// Entries past their TTL but not yet purged
    pub expired_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_is_not_expired() {
        let entry = CacheEntry::new("k", "v", Duration::from_secs(60));
        assert!(!entry.is_expired());
        assert!(entry.age_secs() < 2);
    }

    #[test]
    fn expiry_boundary_is_strict() {
        let entry = CacheEntry::new("k", "v", Duration::from_secs(10));
        let at = entry.created_at;

        assert!(!entry.is_expired_at(at + 9));
        // age == ttl counts as expired
        assert!(entry.is_expired_at(at + 10));
        assert!(entry.is_expired_at(at + 11));
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let entry = CacheEntry::new("k", "v", Duration::from_secs(0));
        assert!(entry.is_expired());
    }
}
