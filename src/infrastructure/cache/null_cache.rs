//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Used when Redis is not configured or unreachable at startup. Every read
/// misses, so queries always go to the database; invalidation finds no keys.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _payload: &str, _ttl: Option<Duration>) -> CacheResult<()> {
        Ok(())
    }

    async fn keys(&self, _pattern: &str) -> CacheResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn delete(&self, _keys: &[String]) -> CacheResult<u64> {
        Ok(0)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_never_hits() {
        let cache = NullCache::new();
        cache.set("currencies:USD", "[]", None).await.unwrap();

        assert!(cache.get("currencies:USD").await.unwrap().is_none());
        assert!(cache.keys("currencies:*").await.unwrap().is_empty());
        assert_eq!(cache.delete(&["currencies:USD".to_string()]).await.unwrap(), 0);
    }
}
