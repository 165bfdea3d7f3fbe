//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and access
//! bookkeeping.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A single cached value plus the metadata the eviction policies need.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Time-to-live in milliseconds, measured from `created_at`
    pub ttl_ms: u64,
    /// Number of successful reads since creation (starts at 1 on insert)
    pub access_count: u64,
    /// Timestamp of the most recent successful read (Unix milliseconds)
    pub last_accessed: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with the given TTL.
    ///
    /// A freshly inserted entry counts as accessed once.
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        Self {
            value,
            created_at: now,
            ttl_ms: ttl.as_millis() as u64,
            access_count: 1,
            last_accessed: now,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived its TTL.
    ///
    /// Boundary condition: an entry expires once strictly more than `ttl_ms`
    /// milliseconds have elapsed since creation. At exactly `ttl_ms` elapsed
    /// it is still alive.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms().saturating_sub(self.created_at) > self.ttl_ms
    }

    // == Touch ==
    /// Records a successful read: bumps the access count and refreshes the
    /// last-accessed timestamp.
    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_accessed = current_timestamp_ms();
    }

    // == Idle Time ==
    /// Milliseconds since the entry was last read.
    pub fn idle_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.last_accessed)
    }

    // == Time To Live ==
    /// Returns the remaining TTL, clamped at zero once expired.
    ///
    /// Useful for diagnostics; the store itself only consults `is_expired`.
    pub fn ttl_remaining(&self) -> Duration {
        let elapsed = current_timestamp_ms().saturating_sub(self.created_at);
        Duration::from_millis(self.ttl_ms.saturating_sub(elapsed))
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
