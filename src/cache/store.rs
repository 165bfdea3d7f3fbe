//! Cache Store Module
//!
//! The bounded key/value map: HashMap storage with lazy TTL expiry, LRU
//! eviction on capacity pressure, batch and pattern-scoped operations, and
//! the hit/miss counters.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use globset::{Glob, GlobMatcher};
use serde::Serialize;

use crate::cache::entry::CacheEntry;
use crate::cache::eviction;
use crate::cache::stats::{CacheStats, StatsSnapshot};
use crate::cache::CULL_FRACTION;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Bounded cache storage with LRU eviction and TTL support.
///
/// The store is the single-threaded core; `CacheEngine` adds the lock and
/// the maintenance lifecycle around it.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL applied when a `set` call does not carry one
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with the given capacity and default TTL.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// An entry found past its TTL is removed on the spot and reported as a
    /// miss; until something reads or sweeps it, an expired entry keeps
    /// occupying capacity. A live hit refreshes the entry's access
    /// bookkeeping.
    pub fn get(&mut self, key: &str) -> Option<V> {
        match self.entries.get_mut(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.stats.record_expired();
                self.stats.record_miss();
                None
            }
            Some(entry) => {
                entry.touch();
                let value = entry.value.clone();
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair with an optional TTL.
    ///
    /// If the key is new and the store is at capacity, the least recently
    /// used entry is evicted first. Overwriting an existing key never
    /// changes size and never evicts; it rewrites the full entry, so the
    /// TTL clock and access bookkeeping start over.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_lru();
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    ///
    /// No effect on the counters.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Has ==
    /// Expiry-aware existence check.
    ///
    /// Unlike `get` this neither counts a hit/miss nor refreshes access
    /// bookkeeping, but an expired entry discovered here is still removed
    /// and counted as expired.
    pub fn has(&mut self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.stats.record_expired();
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    // == Clear ==
    /// Empties the store and resets all counters to zero.
    ///
    /// The one operation that also resets statistics; `cleanup_expired`
    /// does not.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.reset();
    }

    // == Multi-Get ==
    /// Per-key `get`; keys that miss are omitted from the result.
    pub fn mget<S: AsRef<str>>(&mut self, keys: &[S]) -> HashMap<String, V> {
        let mut found = HashMap::new();
        for key in keys {
            let key = key.as_ref();
            if let Some(value) = self.get(key) {
                found.insert(key.to_string(), value);
            }
        }
        found
    }

    // == Multi-Set ==
    /// Per-entry `set` with one shared TTL.
    ///
    /// Not atomic: entries land one at a time, in iteration order.
    pub fn mset(&mut self, entries: impl IntoIterator<Item = (String, V)>, ttl: Option<Duration>) {
        for (key, value) in entries {
            self.set(key, value, ttl);
        }
    }

    // == Get By Pattern ==
    /// Returns every non-expired entry whose key matches the glob pattern.
    ///
    /// Read-only with respect to expired entries: they are filtered out of
    /// the result but left for the lazy/periodic expiry paths to remove.
    pub fn get_by_pattern(&self, pattern: &str) -> Result<HashMap<String, V>> {
        let matcher = compile_pattern(pattern)?;
        Ok(self
            .entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && matcher.is_match(key.as_str()))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect())
    }

    // == Delete By Pattern ==
    /// Deletes every entry whose key matches the glob pattern, expired or
    /// not, and returns the number removed.
    ///
    /// Deliberately asymmetric with `get_by_pattern`: the delete path is
    /// unconditional.
    pub fn delete_by_pattern(&mut self, pattern: &str) -> Result<usize> {
        let matcher = compile_pattern(pattern)?;
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| matcher.is_match(key.as_str()))
            .cloned()
            .collect();

        for key in &matching {
            self.entries.remove(key);
        }
        Ok(matching.len())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, counting each as expired.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.entries.remove(&key);
            self.stats.record_expired();
        }
        count
    }

    // == Aggressive Cleanup ==
    /// Culls the bottom fifth of entries by retention score, counting each
    /// removal as an eviction.
    ///
    /// Batched and score-based, unlike the single-victim LRU scan on the
    /// set path. Returns the number of entries removed.
    pub fn aggressive_cleanup(&mut self) -> usize {
        let victims = eviction::cull_candidates(&self.entries, CULL_FRACTION);
        for key in &victims {
            self.entries.remove(key);
            self.stats.record_eviction();
        }
        victims.len()
    }

    // == Stats ==
    /// Read access to the raw counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Zeroes the counters without touching stored entries.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // == Snapshot ==
    /// Builds the on-demand statistics report.
    ///
    /// The memory figure approximates two bytes per serialized character; a
    /// value that fails to serialize contributes zero rather than failing
    /// the whole snapshot.
    pub fn snapshot(&self) -> StatsSnapshot
    where
        V: Serialize,
    {
        let oldest_entry_ms = self.entries.values().map(|e| e.created_at).min().unwrap_or(0);
        let newest_entry_ms = self.entries.values().map(|e| e.created_at).max().unwrap_or(0);
        let approx_memory_bytes = self
            .entries
            .values()
            .map(|entry| {
                serde_json::to_string(&entry.value)
                    .map(|json| json.len() * 2)
                    .unwrap_or(0)
            })
            .sum();

        StatsSnapshot {
            hits: self.stats.hits,
            misses: self.stats.misses,
            evictions: self.stats.evictions,
            expired: self.stats.expired,
            hit_rate: self.stats.hit_rate(),
            miss_rate: self.stats.miss_rate(),
            total_entries: self.entries.len(),
            oldest_entry_ms,
            newest_entry_ms,
            approx_memory_bytes,
            generated_at: Utc::now(),
        }
    }

    // == Capacity ==
    /// The configured entry-count capacity.
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == LRU Eviction ==
    /// Removes the least recently accessed entry, if any, and counts the
    /// eviction.
    fn evict_lru(&mut self) {
        if let Some(victim) = eviction::lru_victim(&self.entries) {
            self.entries.remove(&victim);
            self.stats.record_eviction();
        }
    }
}

// == Pattern Compilation ==
fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    let glob = Glob::new(pattern).map_err(|source| CacheError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(glob.compile_matcher())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const TTL: Duration = Duration::from_secs(300);

    /// Timestamps are millisecond-granular; separate accesses that must be
    /// ordered.
    fn tick() {
        sleep(Duration::from_millis(5));
    }

    fn store(max_entries: usize) -> CacheStore<String> {
        CacheStore::new(max_entries, TTL)
    }

    #[test]
    fn test_store_new() {
        let s = store(100);
        assert_eq!(s.len(), 0);
        assert!(s.is_empty());
        assert_eq!(s.capacity(), 100);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut s = store(100);

        s.set("key1", "value1".to_string(), None);

        assert_eq!(s.get("key1"), Some("value1".to_string()));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent_counts_miss() {
        let mut s = store(100);

        assert_eq!(s.get("nonexistent"), None);
        assert_eq!(s.stats().misses, 1);
        assert_eq!(s.stats().hits, 0);
    }

    #[test]
    fn test_store_delete() {
        let mut s = store(100);

        s.set("key1", "value1".to_string(), None);

        assert!(s.delete("key1"));
        assert!(!s.delete("key1"));
        assert!(s.is_empty());
        // delete leaves the counters alone
        assert_eq!(s.stats().misses, 0);
    }

    #[test]
    fn test_store_overwrite_keeps_single_entry() {
        let mut s = store(100);

        s.set("key1", "value1".to_string(), None);
        s.set("key1", "value2".to_string(), None);

        assert_eq!(s.get("key1"), Some("value2".to_string()));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let mut s = store(100);

        s.set("key1", "value1".to_string(), Some(Duration::from_millis(20)));
        s.set("key1", "value2".to_string(), Some(Duration::from_secs(60)));

        sleep(Duration::from_millis(50));

        // The short TTL died with the old entry
        assert_eq!(s.get("key1"), Some("value2".to_string()));
    }

    #[test]
    fn test_store_overwrite_does_not_evict() {
        let mut s = store(2);

        s.set("a", "1".to_string(), None);
        tick();
        s.set("b", "2".to_string(), None);
        tick();
        s.set("a", "1b".to_string(), None);

        assert_eq!(s.len(), 2);
        assert_eq!(s.get("b"), Some("2".to_string()));
        assert_eq!(s.stats().evictions, 0);
    }

    #[test]
    fn test_store_ttl_expiration_on_get() {
        let mut s = store(100);

        s.set("key1", "value1".to_string(), Some(Duration::from_millis(20)));
        assert_eq!(s.get("key1"), Some("value1".to_string()));

        sleep(Duration::from_millis(50));

        assert_eq!(s.get("key1"), None);
        assert_eq!(s.stats().expired, 1);
        assert_eq!(s.stats().misses, 1);
        assert!(s.is_empty());
    }

    #[test]
    fn test_store_lru_eviction_order() {
        let mut s = store(2);

        s.set("a", "1".to_string(), None);
        tick();
        s.set("b", "2".to_string(), None);
        tick();
        // Reading A makes B the least recently used
        s.get("a");
        tick();
        s.set("c", "3".to_string(), None);

        assert_eq!(s.len(), 2);
        assert!(s.get("a").is_some());
        assert!(s.get("b").is_none());
        assert!(s.get("c").is_some());
        assert_eq!(s.stats().evictions, 1);
    }

    #[test]
    fn test_store_capacity_invariant() {
        let mut s = store(3);

        for i in 0..10 {
            s.set(format!("key{}", i), "v".to_string(), None);
            assert!(s.len() <= 3);
            tick();
        }
        assert_eq!(s.stats().evictions, 7);
    }

    #[test]
    fn test_store_has_does_not_touch_counters_or_access() {
        let mut s = store(2);

        s.set("a", "1".to_string(), None);
        tick();
        s.set("b", "2".to_string(), None);
        tick();

        // `has` on A must not refresh its recency
        assert!(s.has("a"));
        assert!(!s.has("missing"));
        assert_eq!(s.stats().hits, 0);
        assert_eq!(s.stats().misses, 0);

        s.set("c", "3".to_string(), None);
        // A was inserted first and never read, so it was the LRU victim
        assert!(s.get("a").is_none());
    }

    #[test]
    fn test_store_has_removes_expired() {
        let mut s = store(100);

        s.set("key1", "value1".to_string(), Some(Duration::from_millis(20)));
        sleep(Duration::from_millis(50));

        assert!(!s.has("key1"));
        assert!(s.is_empty());
        assert_eq!(s.stats().expired, 1);
        // no miss recorded on the `has` path
        assert_eq!(s.stats().misses, 0);
    }

    #[test]
    fn test_store_clear_resets_stats() {
        let mut s = store(100);

        s.set("key1", "value1".to_string(), None);
        s.get("key1");
        s.get("missing");

        s.clear();

        assert!(s.is_empty());
        assert_eq!(s.stats().hits, 0);
        assert_eq!(s.stats().misses, 0);
    }

    #[test]
    fn test_store_reset_stats_leaves_data() {
        let mut s = store(100);

        s.set("key1", "value1".to_string(), None);
        s.get("missing");

        s.reset_stats();

        assert_eq!(s.stats().misses, 0);
        assert_eq!(s.get("key1"), Some("value1".to_string()));
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut s = store(100);

        s.set("short", "v".to_string(), Some(Duration::from_millis(20)));
        s.set("long", "v".to_string(), Some(Duration::from_secs(60)));

        sleep(Duration::from_millis(50));

        assert_eq!(s.cleanup_expired(), 1);
        assert_eq!(s.len(), 1);
        assert_eq!(s.stats().expired, 1);
        // cleanup is not clear: counters other than `expired` survive
        assert!(s.get("long").is_some());
    }

    #[test]
    fn test_store_mget() {
        let mut s = store(100);

        s.set("a", "1".to_string(), None);
        s.set("b", "2".to_string(), None);

        let found = s.mget(&["a", "b", "missing"]);

        assert_eq!(found.len(), 2);
        assert_eq!(found.get("a"), Some(&"1".to_string()));
        assert_eq!(found.get("b"), Some(&"2".to_string()));
        assert_eq!(s.stats().hits, 2);
        assert_eq!(s.stats().misses, 1);
    }

    #[test]
    fn test_store_mset_shared_ttl() {
        let mut s = store(100);

        s.mset(
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ],
            Some(Duration::from_millis(20)),
        );

        assert_eq!(s.len(), 2);
        sleep(Duration::from_millis(50));
        assert_eq!(s.cleanup_expired(), 2);
    }

    #[test]
    fn test_store_get_by_pattern_filters_expired_without_deleting() {
        let mut s = store(100);

        s.set("user:1", "alice".to_string(), None);
        s.set("user:2", "bob".to_string(), Some(Duration::from_millis(20)));
        s.set("order:1", "widget".to_string(), None);

        sleep(Duration::from_millis(50));

        let users = s.get_by_pattern("user:*").unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users.get("user:1"), Some(&"alice".to_string()));

        // the expired entry is filtered from the result but still occupies
        // the store until the lazy/periodic paths remove it
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_store_delete_by_pattern_is_unconditional() {
        let mut s = store(100);

        s.set("user:1", "alice".to_string(), None);
        s.set("user:2", "bob".to_string(), Some(Duration::from_millis(20)));
        s.set("order:1", "widget".to_string(), None);

        sleep(Duration::from_millis(50));

        // the expired-but-unswept entry counts too
        assert_eq!(s.delete_by_pattern("user:*").unwrap(), 2);
        assert_eq!(s.len(), 1);
        assert!(s.get("order:1").is_some());
    }

    #[test]
    fn test_store_invalid_pattern() {
        let s = store(100);

        let result = s.get_by_pattern("user:[");
        assert!(matches!(result, Err(CacheError::InvalidPattern { .. })));
    }

    #[test]
    fn test_store_aggressive_cleanup_culls_fifth() {
        let mut s = store(100);

        for i in 0..10 {
            s.set(format!("key{}", i), "v".to_string(), None);
        }
        // make most entries hot so the untouched ones sort last
        for _ in 0..5 {
            for i in 2..10 {
                s.get(&format!("key{}", i));
            }
        }

        let removed = s.aggressive_cleanup();

        assert_eq!(removed, 2);
        assert_eq!(s.len(), 8);
        assert_eq!(s.stats().evictions, 2);
        // the two cold entries were the victims
        assert!(!s.has("key0"));
        assert!(!s.has("key1"));
    }

    #[test]
    fn test_store_snapshot_empty() {
        let s = store(100);

        let snap = s.snapshot();

        assert_eq!(snap.total_entries, 0);
        assert_eq!(snap.oldest_entry_ms, 0);
        assert_eq!(snap.newest_entry_ms, 0);
        assert_eq!(snap.approx_memory_bytes, 0);
        assert_eq!(snap.hit_rate, 0.0);
        assert_eq!(snap.miss_rate, 0.0);
    }

    #[test]
    fn test_store_snapshot_populated() {
        let mut s = store(100);

        s.set("a", "hello".to_string(), None);
        tick();
        s.set("b", "world".to_string(), None);
        s.get("a");
        s.get("missing");

        let snap = s.snapshot();

        assert_eq!(snap.total_entries, 2);
        assert!(snap.oldest_entry_ms > 0);
        assert!(snap.newest_entry_ms >= snap.oldest_entry_ms);
        // two 5-char strings serialize to "hello"/"world" with quotes
        assert_eq!(snap.approx_memory_bytes, 2 * (7 * 2));
        assert!((snap.hit_rate - 0.5).abs() < f64::EPSILON);
        assert!((snap.hit_rate + snap.miss_rate - 1.0).abs() < f64::EPSILON);
    }
}
