use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::constants::{SHORT_CACHE_MAX_ENTRIES, SHORT_CACHE_TTL_SECONDS};
use crate::models::TimeWindow;
use crate::services::clock::Clock;
use crate::utils::format_local_timestamp;

/// Cached value with its write time
#[derive(Clone, Debug)]
pub struct CacheEntry<T> {
    pub value: T,
    pub written_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.written_at) < ttl
    }
}

/// Cache key for a resolved window of an index
pub fn window_cache_key(index_code: &str, window: &TimeWindow) -> String {
    format!(
        "{}_{}_{}",
        index_code.to_uppercase(),
        format_local_timestamp(&window.start()),
        format_local_timestamp(&window.end())
    )
}

/// Process-wide in-memory cache with a fixed TTL
///
/// Stale entries are never served. They are dropped by `purge_expired` and
/// whenever a `put` finds the cache full, in which case the oldest entry is
/// evicted as well.
pub struct ShortTermCache<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl<T: Clone + Send + Sync> ShortTermCache<T> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_limits(
            clock,
            Duration::seconds(SHORT_CACHE_TTL_SECONDS),
            SHORT_CACHE_MAX_ENTRIES,
        )
    }

    pub fn with_limits(clock: Arc<dyn Clock>, ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
            clock,
        }
    }

    /// Value for `key` if present and younger than the TTL
    pub async fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now_utc();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Unconditional overwrite
    pub async fn put(&self, key: impl Into<String>, value: T) {
        let key = key.into();
        let now = self.clock.now_utc();
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh(now, self.ttl));

            // Still full: evict the oldest entry (LRU-like)
            if entries.len() >= self.max_entries {
                if let Some(oldest_key) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.written_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest_key);
                    tracing::debug!(key = %oldest_key, "Evicted oldest snapshot cache entry");
                }
            }

            tracing::debug!(
                removed = before - entries.len(),
                remaining = entries.len(),
                "Made room in snapshot cache"
            );
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                written_at: now,
            },
        );
    }

    /// Drop every stale entry; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now_utc();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
