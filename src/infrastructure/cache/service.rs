//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value cache used in front of the observation store.
///
/// Implementations report failures instead of hiding them; callers decide
/// whether an error is fatal. The query path treats read and write failures
/// as misses, while the ingestion daemon treats enumeration and delete
/// failures as a failed cycle.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::InMemoryCache`] - Process-local cache for tests and tooling
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves a payload.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(payload))` on cache hit
    /// - `Ok(None)` on cache miss
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores a payload, with no expiry when `ttl` is `None`.
    async fn set(&self, key: &str, payload: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Lists keys matching a glob pattern (`*` and `?` wildcards).
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;

    /// Deletes the given keys and returns how many existed.
    async fn delete(&self, keys: &[String]) -> CacheResult<u64>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by health check endpoints to report cache status.
    async fn health_check(&self) -> bool;
}
