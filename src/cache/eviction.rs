//! Eviction Policy Module
//!
//! Victim selection for the two eviction paths: the single-victim LRU scan
//! used on the write path, and the batched retention-score cull used by the
//! optimize pass.

use std::collections::HashMap;

use crate::cache::entry::{current_timestamp_ms, CacheEntry};

// == Scoring Weights ==
/// Weight of the access frequency term in the retention score.
const FREQUENCY_WEIGHT: f64 = 0.7;

/// Weight of the idle-time penalty in the retention score.
const IDLE_WEIGHT: f64 = 0.3;

// == LRU Victim ==
/// Returns the key of the least-recently-accessed entry, or `None` if the
/// map is empty.
///
/// Full scan. Ties on `last_accessed` are broken by map iteration order.
pub(crate) fn lru_victim<V>(entries: &HashMap<String, CacheEntry<V>>) -> Option<String> {
    entries
        .iter()
        .min_by_key(|(_, entry)| entry.last_accessed)
        .map(|(key, _)| key.clone())
}

// == Retention Score ==
/// Scores an entry's worthiness to stay cached.
///
/// Frequently read entries score higher; entries that have sat unread score
/// lower. Idle time is measured in seconds so a handful of reads is not
/// drowned out by millisecond noise.
pub(crate) fn retention_score<V>(entry: &CacheEntry<V>, now: u64) -> f64 {
    let idle_secs = now.saturating_sub(entry.last_accessed) as f64 / 1000.0;
    entry.access_count as f64 * FREQUENCY_WEIGHT - idle_secs * IDLE_WEIGHT
}

// == Cull Candidates ==
/// Returns the keys of the bottom `floor(len * fraction)` entries by
/// retention score, lowest first.
///
/// An empty result means the store is too small for the fraction to round
/// up to a single entry.
pub(crate) fn cull_candidates<V>(
    entries: &HashMap<String, CacheEntry<V>>,
    fraction: f64,
) -> Vec<String> {
    let count = (entries.len() as f64 * fraction).floor() as usize;
    if count == 0 {
        return Vec::new();
    }

    let now = current_timestamp_ms();
    let mut scored: Vec<(String, f64)> = entries
        .iter()
        .map(|(key, entry)| (key.clone(), retention_score(entry, now)))
        .collect();

    scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(count);
    scored.into_iter().map(|(key, _)| key).collect()
}
