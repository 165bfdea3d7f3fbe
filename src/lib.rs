//! Embercache - A bounded in-process cache engine
//!
//! Provides a key/value store with per-entry TTL expiry, LRU eviction under
//! capacity pressure, hit/miss instrumentation, batch and pattern-scoped
//! operations, and background maintenance (periodic sweep, optimize pass,
//! warm-up).

pub mod cache;
pub mod config;
pub mod domains;
pub mod engine;
pub mod error;
pub mod tasks;
pub mod warmup;

pub use cache::{CacheEntry, CacheStats, CacheStore, StatsSnapshot};
pub use config::CacheConfig;
pub use domains::DomainCache;
pub use engine::{CacheEngine, OptimizeSummary};
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
pub use warmup::{StaticWarmUpSource, WarmEntry, WarmUpSource};
