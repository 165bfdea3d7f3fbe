//! Cache Statistics Module
//!
//! Tracks cache performance counters and produces the on-demand snapshot
//! report.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// The four raw performance counters.
///
/// Reset only by `CacheStore::reset_stats` or `CacheStore::clear`; the
/// maintenance sweeps increment `expired`/`evictions` as removals happen but
/// never reset anything.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted under capacity pressure or culled by the
    /// optimize pass
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expired: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Miss Rate ==
    /// Returns misses / (hits + misses), or 0.0 if no requests have been made.
    pub fn miss_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.misses as f64 / total as f64
        }
    }

    // == Recorders ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Increments the expired-removal counter.
    pub fn record_expired(&mut self) {
        self.expired += 1;
    }

    // == Reset ==
    /// Zeroes all four counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Stats Snapshot ==
/// A point-in-time report over the counters and the current entry set.
///
/// Computed on demand by `CacheStore::snapshot`; nothing here is maintained
/// incrementally except the raw counters it copies.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Raw counters at snapshot time
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired: u64,
    /// hits / (hits + misses); 0.0 before the first request
    pub hit_rate: f64,
    /// misses / (hits + misses); 0.0 before the first request
    pub miss_rate: f64,
    /// Current number of live entries
    pub total_entries: usize,
    /// Creation timestamp of the oldest entry (Unix ms), 0 when empty
    pub oldest_entry_ms: u64,
    /// Creation timestamp of the newest entry (Unix ms), 0 when empty
    pub newest_entry_ms: u64,
    /// Rough serialized-size estimate of all stored values, in bytes.
    /// Not an exact accounting; unserializable values contribute nothing.
    pub approx_memory_bytes: usize,
    /// When this snapshot was taken
    pub generated_at: DateTime<Utc>,
}
