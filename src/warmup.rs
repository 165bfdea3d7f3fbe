//! Warm-Up Module
//!
//! Pluggable pre-population of the cache before real traffic arrives.
//!
//! The engine only defines the seam: a source yields seed entries and the
//! engine stores them. Deriving genuinely hot keys from access telemetry is
//! an integration point for the host, not something this crate guesses at;
//! the shipped `StaticWarmUpSource` covers the fixed-placeholder case.

use std::time::Duration;

use async_trait::async_trait;

// == Warm Entry ==
/// One seed record produced by a warm-up source.
#[derive(Debug, Clone)]
pub struct WarmEntry<V> {
    /// Cache key to populate
    pub key: String,
    /// Value to store
    pub value: V,
    /// Optional TTL; the engine default applies when absent
    pub ttl: Option<Duration>,
}

impl<V> WarmEntry<V> {
    /// Creates a seed entry that uses the engine's default TTL.
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
            ttl: None,
        }
    }

    /// Creates a seed entry with an explicit TTL.
    pub fn with_ttl(key: impl Into<String>, value: V, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            value,
            ttl: Some(ttl),
        }
    }
}

// == Warm-Up Source ==
/// A producer of seed entries for `CacheEngine::warm_up`.
///
/// Sources may suspend on external work (a database read, a telemetry
/// query). A failing source aborts the warm-up; entries from any earlier
/// warm-up calls are not rolled back.
#[async_trait]
pub trait WarmUpSource<V>: Send + Sync {
    /// Produces the entries to pre-load.
    async fn load(&self) -> anyhow::Result<Vec<WarmEntry<V>>>;
}

// == Static Source ==
/// A warm-up source backed by a fixed list of seeds.
pub struct StaticWarmUpSource<V> {
    entries: Vec<WarmEntry<V>>,
}

impl<V> StaticWarmUpSource<V> {
    /// Creates a source that yields the given seeds.
    pub fn new(entries: Vec<WarmEntry<V>>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl<V: Clone + Send + Sync> WarmUpSource<V> for StaticWarmUpSource<V> {
    async fn load(&self) -> anyhow::Result<Vec<WarmEntry<V>>> {
        Ok(self.entries.clone())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_yields_seeds() {
        let source = StaticWarmUpSource::new(vec![
            WarmEntry::new("a", 1u32),
            WarmEntry::with_ttl("b", 2u32, Duration::from_secs(5)),
        ]);

        let seeds = source.load().await.unwrap();

        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].key, "a");
        assert!(seeds[0].ttl.is_none());
        assert_eq!(seeds[1].ttl, Some(Duration::from_secs(5)));
    }
}
