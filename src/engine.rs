//! Cache Engine Module
//!
//! The public async surface over the store: shared-state wrapper, batch and
//! pattern operations, instrumentation, and the maintenance lifecycle
//! (periodic sweep, optimize pass, warm-up, stop).

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore, StatsSnapshot, HIGH_WATER_RATIO};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweep_task;
use crate::warmup::WarmUpSource;

// == Optimize Summary ==
/// What one `optimize` pass removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptimizeSummary {
    /// Entries removed because their TTL had elapsed
    pub expired_removed: usize,
    /// Entries culled by aggressive cleanup (0 below the high-water mark)
    pub evicted: usize,
}

// == Cache Engine ==
/// An in-process cache engine bound to one store instance.
///
/// Wraps the store in `Arc<RwLock<_>>` for shared access and owns the
/// background sweep task, whose lifetime is tied 1:1 to this engine —
/// `stop()` cancels it. Handles are cheap to clone; clones share the store
/// and the sweeper.
///
/// Must be constructed inside a Tokio runtime, since construction spawns
/// the sweep task.
#[derive(Clone)]
pub struct CacheEngine<V> {
    /// Thread-safe cache store
    store: Arc<RwLock<CacheStore<V>>>,
    /// Handle for the periodic sweep task, taken on `stop()`
    sweeper: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Optional host-supplied memory-reclamation callback
    memory_hint: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl<V> CacheEngine<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a new engine and starts its expiry sweep task.
    pub fn new(config: CacheConfig) -> Self {
        let store = Arc::new(RwLock::new(CacheStore::new(
            config.max_entries,
            config.default_ttl,
        )));
        let sweeper = spawn_sweep_task(store.clone(), config.sweep_interval);

        Self {
            store,
            sweeper: Arc::new(Mutex::new(Some(sweeper))),
            memory_hint: None,
        }
    }

    /// Registers a best-effort memory-reclamation callback, invoked after
    /// an aggressive cleanup pass.
    ///
    /// Purely advisory; correctness never depends on it running.
    pub fn with_memory_hint(mut self, hint: impl Fn() + Send + Sync + 'static) -> Self {
        self.memory_hint = Some(Arc::new(hint));
        self
    }

    // == Core Operations ==
    /// Retrieves a value by key. See `CacheStore::get` for expiry and
    /// bookkeeping semantics.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.store.write().await.get(key)
    }

    /// Stores a key-value pair, evicting the LRU entry if a new key would
    /// exceed capacity.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        self.store.write().await.set(key, value, ttl);
    }

    /// Removes an entry by key. Returns whether anything was removed.
    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    /// Expiry-aware existence check without access bookkeeping.
    pub async fn has(&self, key: &str) -> bool {
        self.store.write().await.has(key)
    }

    /// Empties the store and resets all counters.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Current number of entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    // == Get Or Set ==
    /// Returns the cached value, or produces one with `fetcher`, stores it,
    /// and returns it.
    ///
    /// The store lock is NOT held across the fetch, so concurrent misses on
    /// the same key each invoke their own fetcher and the last writer wins.
    /// That thundering-herd window is a documented property of this
    /// operation, not a defect; callers needing single-flight must coalesce
    /// upstream. A failed fetch propagates and caches nothing.
    pub async fn get_or_set<F, Fut>(&self, key: &str, fetcher: F, ttl: Option<Duration>) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>>,
    {
        if let Some(value) = self.store.write().await.get(key) {
            return Ok(value);
        }

        let value = fetcher().await.map_err(|source| CacheError::FetchFailed {
            key: key.to_string(),
            source,
        })?;

        self.store
            .write()
            .await
            .set(key.to_string(), value.clone(), ttl);
        Ok(value)
    }

    // == Batch Operations ==
    /// Per-key `get`; missing keys are omitted from the result.
    pub async fn mget<S: AsRef<str>>(&self, keys: &[S]) -> HashMap<String, V> {
        self.store.write().await.mget(keys)
    }

    /// Per-entry `set` with one shared TTL; not atomic.
    pub async fn mset(&self, entries: impl IntoIterator<Item = (String, V)>, ttl: Option<Duration>) {
        self.store.write().await.mset(entries, ttl);
    }

    // == Pattern Operations ==
    /// All non-expired entries whose key matches the glob pattern.
    pub async fn get_by_pattern(&self, pattern: &str) -> Result<HashMap<String, V>> {
        self.store.read().await.get_by_pattern(pattern)
    }

    /// Deletes every matching entry, expired or not; returns the count.
    pub async fn delete_by_pattern(&self, pattern: &str) -> Result<usize> {
        self.store.write().await.delete_by_pattern(pattern)
    }

    // == Instrumentation ==
    /// A copy of the raw counters.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats().clone()
    }

    /// Zeroes the counters without touching stored entries.
    pub async fn reset_stats(&self) {
        self.store.write().await.reset_stats();
    }

    // == Optimize ==
    /// Runs one expiry cleanup, then aggressive cleanup if occupancy is
    /// above the high-water mark, then the memory-reclamation hint if one
    /// is registered and anything was culled.
    pub async fn optimize(&self) -> OptimizeSummary {
        let (expired_removed, evicted, remaining) = {
            let mut store = self.store.write().await;
            let expired = store.cleanup_expired();

            let high_water = store.capacity() as f64 * HIGH_WATER_RATIO;
            let evicted = if store.len() as f64 > high_water {
                store.aggressive_cleanup()
            } else {
                0
            };
            (expired, evicted, store.len())
        };

        if expired_removed > 0 {
            info!("Optimize: removed {} expired entries", expired_removed);
        }
        if evicted > 0 {
            info!(
                "Optimize: aggressive cleanup culled {} entries, {} remain",
                evicted, remaining
            );
            if let Some(hint) = &self.memory_hint {
                debug!("Requesting memory reclamation");
                hint();
            }
        }

        OptimizeSummary {
            expired_removed,
            evicted,
        }
    }

    // == Warm-Up ==
    /// Pre-populates the store from a pluggable source of seed entries.
    ///
    /// Returns the number of entries loaded. A failing source propagates
    /// after logging; anything warmed by earlier calls stays cached.
    pub async fn warm_up(&self, source: &dyn WarmUpSource<V>) -> Result<usize> {
        let seeds = match source.load().await {
            Ok(seeds) => seeds,
            Err(source) => {
                warn!("Warm-up source failed: {:#}", source);
                return Err(CacheError::WarmUpFailed { source });
            }
        };

        let count = seeds.len();
        {
            let mut store = self.store.write().await;
            for seed in seeds {
                store.set(seed.key, seed.value, seed.ttl);
            }
        }
        info!("Warm-up pre-loaded {} entries", count);
        Ok(count)
    }

    // == Stop ==
    /// Cancels the sweep task and clears the store (which also resets the
    /// counters), leaving the engine inert and droppable.
    pub async fn stop(&self) {
        if let Some(handle) = self.sweeper.lock().await.take() {
            handle.abort();
        }
        self.store.write().await.clear();
        info!("Cache engine stopped");
    }
}

impl<V> CacheEngine<V>
where
    V: Clone + Serialize + Send + Sync + 'static,
{
    // == Snapshot ==
    /// The on-demand statistics report, including the approximate memory
    /// estimate.
    pub async fn snapshot(&self) -> StatsSnapshot {
        self.store.read().await.snapshot()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn test_engine() -> CacheEngine<String> {
        CacheEngine::new(CacheConfig {
            max_entries: 100,
            default_ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
        })
    }

    #[tokio::test]
    async fn test_engine_set_and_get() {
        let engine = test_engine();

        engine.set("key1", "value1".to_string(), None).await;

        assert_eq!(engine.get("key1").await, Some("value1".to_string()));
        engine.stop().await;
    }

    #[tokio::test]
    async fn test_engine_get_or_set_fetches_once() {
        let engine = test_engine();

        let first = engine
            .get_or_set("key", || async { Ok("fetched".to_string()) }, None)
            .await
            .unwrap();
        let second = engine
            .get_or_set(
                "key",
                || async { panic!("fetcher must not run on a hit") },
                None,
            )
            .await
            .unwrap();

        assert_eq!(first, "fetched");
        assert_eq!(second, "fetched");
        engine.stop().await;
    }

    #[tokio::test]
    async fn test_engine_get_or_set_failure_caches_nothing() {
        let engine = test_engine();

        let result = engine
            .get_or_set(
                "key",
                || async { Err(anyhow::anyhow!("backend unavailable")) },
                None,
            )
            .await;

        assert!(matches!(result, Err(CacheError::FetchFailed { .. })));
        assert!(!engine.has("key").await);
        engine.stop().await;
    }

    #[tokio::test]
    async fn test_engine_stop_clears_and_cancels() {
        let engine = test_engine();

        engine.set("key1", "value1".to_string(), None).await;
        engine.stop().await;

        assert!(engine.is_empty().await);
        assert!(engine.sweeper.lock().await.is_none());
    }
}
