//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.
//!
//! Missing keys, expired entries, and capacity pressure are normal control
//! flow for this engine, not errors; the variants here are the failures
//! that must surface to callers.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A key pattern failed to compile as a glob
    #[error("Invalid key pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },

    /// A `get_or_set` fetcher failed; nothing was cached
    #[error("Fetch for key '{key}' failed: {source}")]
    FetchFailed {
        key: String,
        source: anyhow::Error,
    },

    /// A warm-up source failed to produce its seed entries
    #[error("Warm-up failed: {source}")]
    WarmUpFailed { source: anyhow::Error },
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
