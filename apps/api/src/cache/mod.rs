//! Bounded TTL cache for inference results.
//!
//! Entries are keyed by a SHA-256 fingerprint of a caller-built logical key
//! (`tag:field:...:truncated_input`). Expiry is checked lazily on read; there
//! is no background sweep. When a `put` pushes the store over `max_entries`,
//! the oldest entries are dropped in one batch so the store lands at
//! `max_entries - eviction_batch`.
//!
//! Every operation takes the one store-wide lock. Stores hold at most a few
//! hundred entries, so the O(n log n) sort during eviction is cheap.

pub mod key;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

pub use key::{truncate_chars, CacheKey};

/// Sizing and expiry for one cache instance.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
    pub eviction_batch: usize,
}

impl CacheConfig {
    /// `max_entries` is raised to at least 1 and `eviction_batch` is clamped
    /// below it, so an eviction never empties the store.
    pub fn new(ttl: Duration, max_entries: usize, eviction_batch: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            ttl,
            max_entries,
            eviction_batch: eviction_batch.min(max_entries - 1),
        }
    }
}

/// Counters reported on `/health`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    /// Insertion order, breaks ties between equal `stored_at`.
    seq: u64,
}

#[derive(Debug)]
struct Store<V> {
    entries: HashMap<CacheKey, CacheEntry<V>>,
    next_seq: u64,
    stats: CacheStats,
}

impl<V> Store<V> {
    /// Removes the oldest entries until at most `target` remain.
    fn evict_oldest(&mut self, target: usize) -> usize {
        let excess = self.entries.len().saturating_sub(target);
        if excess == 0 {
            return 0;
        }

        let mut by_age: Vec<(Instant, u64, CacheKey)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.stored_at, entry.seq, *key))
            .collect();
        by_age.sort_unstable_by_key(|(stored_at, seq, _)| (*stored_at, *seq));

        for (_, _, key) in by_age.into_iter().take(excess) {
            self.entries.remove(&key);
        }
        excess
    }
}

/// Capacity-limited, time-expiring store. Values are cloned out on `get`.
#[derive(Debug)]
pub struct TtlCache<V> {
    name: &'static str,
    config: CacheConfig,
    store: Mutex<Store<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(name: &'static str, config: CacheConfig) -> Self {
        Self {
            name,
            config,
            store: Mutex::new(Store {
                entries: HashMap::new(),
                next_seq: 0,
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the cached value if present and younger than the TTL.
    /// An expired entry is deleted as a side effect.
    pub fn get(&self, logical_key: &str) -> Option<V> {
        let key = CacheKey::fingerprint(logical_key);
        let now = Instant::now();
        let mut store = self.lock();

        let fresh = match store.entries.get(&key) {
            Some(entry) => now.duration_since(entry.stored_at) < self.config.ttl,
            None => {
                store.stats.misses += 1;
                return None;
            }
        };

        if !fresh {
            store.entries.remove(&key);
            store.stats.expirations += 1;
            store.stats.misses += 1;
            debug!(cache = self.name, key = %key.short(), "Cache entry expired");
            return None;
        }

        store.stats.hits += 1;
        debug!(cache = self.name, key = %key.short(), "Cache hit");
        store.entries.get(&key).map(|entry| entry.value.clone())
    }

    /// Inserts or overwrites the entry, stamping it with the current instant.
    /// May evict unrelated entries when the store goes over capacity.
    pub fn put(&self, logical_key: &str, value: V) {
        let key = CacheKey::fingerprint(logical_key);
        let now = Instant::now();
        let mut store = self.lock();

        let seq = store.next_seq;
        store.next_seq += 1;
        store.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
                seq,
            },
        );

        if store.entries.len() > self.config.max_entries {
            let target = self.config.max_entries - self.config.eviction_batch;
            let evicted = store.evict_oldest(target);
            store.stats.evictions += evicted as u64;
            debug!(
                cache = self.name,
                evicted,
                remaining = store.entries.len(),
                "Cache over capacity, evicted oldest entries"
            );
        }
    }

    /// Drops every entry and returns how many were removed. Counters are kept.
    pub fn clear(&self) -> usize {
        let mut store = self.lock();
        let removed = store.entries.len();
        store.entries.clear();
        info!(cache = self.name, removed, "Cache cleared");
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let store = self.lock();
        CacheStats {
            entries: store.entries.len(),
            ..store.stats
        }
    }

    // Nothing in the store can be left half-updated by a panic, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Store<V>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
impl<V: Clone> TtlCache<V> {
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn cache(ttl_secs: u64, max_entries: usize, batch: usize) -> TtlCache<String> {
        TtlCache::new(
            "test",
            CacheConfig::new(Duration::from_secs(ttl_secs), max_entries, batch),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_then_get_returns_value() {
        let cache = cache(60, 10, 2);
        cache.put("analyze:general:abc", "analysis".to_string());
        assert_eq!(cache.get("analyze:general:abc").as_deref(), Some("analysis"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_missing_key_is_miss() {
        let cache = cache(60, 10, 2);
        assert!(cache.get("nothing").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_is_served_just_before_ttl() {
        let cache = cache(10, 10, 2);
        cache.put("k", "v".to_string());
        advance(Duration::from_millis(9_999)).await;
        assert_eq!(cache.get("k").as_deref(), Some("v"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_missed_and_removed() {
        let cache = cache(10, 10, 2);
        cache.put("k", "v".to_string());
        assert_eq!(cache.len(), 1);

        advance(Duration::from_secs(10) + Duration::from_millis(1)).await;

        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);
        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_at_exact_ttl_is_expired() {
        let cache = cache(10, 10, 2);
        cache.put("k", "v".to_string());
        advance(Duration::from_secs(10)).await;
        assert!(cache.get("k").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_refreshes_timestamp_without_growing() {
        let cache = cache(10, 10, 2);
        cache.put("k", "old".to_string());
        advance(Duration::from_secs(8)).await;
        cache.put("k", "new".to_string());
        advance(Duration::from_secs(8)).await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_size_never_exceeds_max_entries() {
        let cache = cache(600, 100, 20);
        for i in 0..350 {
            cache.put(&format!("key-{i}"), format!("value-{i}"));
            assert!(cache.len() <= 100, "size {} after put {i}", cache.len());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_eviction_keeps_most_recent_entries() {
        let cache = cache(600, 5, 2);
        for i in 0..5 {
            cache.put(&format!("key-{i}"), format!("value-{i}"));
            advance(Duration::from_millis(10)).await;
        }
        assert_eq!(cache.len(), 5);

        // Sixth put goes over capacity: store drops to 5 - 2 = 3 entries.
        cache.put("key-5", "value-5".to_string());
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().evictions, 3);

        for evicted in 0..3 {
            assert!(cache.get(&format!("key-{evicted}")).is_none());
        }
        for kept in 3..6 {
            assert_eq!(
                cache.get(&format!("key-{kept}")),
                Some(format!("value-{kept}"))
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_ties_broken_by_insertion_order() {
        // No time passes, so every stored_at is equal.
        let cache = cache(600, 3, 1);
        for i in 0..4 {
            cache.put(&format!("key-{i}"), format!("value-{i}"));
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.get("key-0").is_none());
        assert!(cache.get("key-1").is_none());
        assert!(cache.get("key-2").is_some());
        assert!(cache.get("key-3").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwritten_entry_counts_as_recent_for_eviction() {
        let cache = cache(600, 3, 1);
        cache.put("a", "1".to_string());
        advance(Duration::from_millis(1)).await;
        cache.put("b", "2".to_string());
        advance(Duration::from_millis(1)).await;
        cache.put("c", "3".to_string());
        advance(Duration::from_millis(1)).await;
        cache.put("a", "1-again".to_string());
        advance(Duration::from_millis(1)).await;
        cache.put("d", "4".to_string());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").as_deref(), Some("1-again"));
        assert_eq!(cache.get("d").as_deref(), Some("4"));
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_removes_everything() {
        let cache = cache(600, 10, 2);
        cache.put("a", "1".to_string());
        cache.put("b", "2".to_string());
        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_is_counted() {
        let cache = cache(600, 10, 2);
        cache.put("a", "1".to_string());
        let _ = cache.get("a");
        let _ = cache.get("a");
        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_config_clamps_eviction_batch() {
        let config = CacheConfig::new(Duration::from_secs(1), 10, 50);
        assert_eq!(config.eviction_batch, 9);

        let config = CacheConfig::new(Duration::from_secs(1), 0, 5);
        assert_eq!(config.max_entries, 1);
        assert_eq!(config.eviction_batch, 0);
    }

    #[test]
    fn test_single_slot_cache_keeps_latest() {
        let cache: TtlCache<u32> =
            TtlCache::new("tiny", CacheConfig::new(Duration::from_secs(60), 1, 0));
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_concurrent_puts_respect_capacity() {
        use std::sync::Arc;

        let cache: Arc<TtlCache<usize>> = Arc::new(TtlCache::new(
            "shared",
            CacheConfig::new(Duration::from_secs(60), 50, 10),
        ));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.put(&format!("{t}-{i}"), i);
                        let _ = cache.get(&format!("{t}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 50);
    }
}
