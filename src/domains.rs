//! Domain Façade Module
//!
//! Namespaced convenience wrappers over a shared engine: a `DomainCache`
//! prefixes every key with its namespace and applies a domain default TTL.
//! No algorithm of its own.

use std::future::Future;
use std::time::Duration;

use crate::engine::CacheEngine;
use crate::error::Result;

// == Domain Cache ==
/// A thin namespaced view of a `CacheEngine`.
///
/// Keys become `"{namespace}:{key}"`, so domains sharing one engine never
/// collide as long as namespaces differ. Dropping the façade does not stop
/// the underlying engine.
#[derive(Clone)]
pub struct DomainCache<V> {
    engine: CacheEngine<V>,
    namespace: String,
    default_ttl: Duration,
}

impl<V> DomainCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a façade over `engine` for the given namespace and domain
    /// default TTL.
    pub fn new(engine: CacheEngine<V>, namespace: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            engine,
            namespace: namespace.into(),
            default_ttl,
        }
    }

    /// Cached domain entities (identity-keyed records).
    pub fn entity(engine: CacheEngine<V>) -> Self {
        Self::new(engine, "entity", Duration::from_secs(600))
    }

    /// Per-user behavioral aggregates.
    pub fn user_behavior(engine: CacheEngine<V>) -> Self {
        Self::new(engine, "user-behavior", Duration::from_secs(1800))
    }

    /// Upstream service health markers; these go stale fastest.
    pub fn service_health(engine: CacheEngine<V>) -> Self {
        Self::new(engine, "service-health", Duration::from_secs(60))
    }

    // == Key Scoping ==
    fn scoped(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// The namespace this façade prefixes keys with.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // == Operations ==
    /// Retrieves a value by domain-local key.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.engine.get(&self.scoped(key)).await
    }

    /// Stores a value under the domain default TTL.
    pub async fn set(&self, key: &str, value: V) {
        self.engine
            .set(self.scoped(key), value, Some(self.default_ttl))
            .await;
    }

    /// Stores a value with an explicit TTL overriding the domain default.
    pub async fn set_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        self.engine.set(self.scoped(key), value, Some(ttl)).await;
    }

    /// Removes a domain-local key.
    pub async fn delete(&self, key: &str) -> bool {
        self.engine.delete(&self.scoped(key)).await
    }

    /// Expiry-aware existence check.
    pub async fn has(&self, key: &str) -> bool {
        self.engine.has(&self.scoped(key)).await
    }

    /// `get_or_set` with the domain default TTL.
    pub async fn get_or_set<F, Fut>(&self, key: &str, fetcher: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>>,
    {
        self.engine
            .get_or_set(&self.scoped(key), fetcher, Some(self.default_ttl))
            .await
    }

    /// Drops every entry in this domain; returns the number removed.
    pub async fn invalidate_all(&self) -> Result<usize> {
        self.engine
            .delete_by_pattern(&format!("{}:*", self.namespace))
            .await
    }
}
