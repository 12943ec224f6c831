//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Number of keys requested per SCAN round trip.
const SCAN_BATCH: usize = 500;

/// Redis cache implementation.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection reuse.
/// Key enumeration uses incremental `SCAN` so invalidation never blocks Redis
/// the way `KEYS` would.
pub struct RedisCache {
    client: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self { client: manager })
    }
}

fn operation_error(op: &str, key: &str, e: redis::RedisError) -> CacheError {
    CacheError::OperationError(format!("Redis {} failed for {}: {}", op, key, e))
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.client.clone();

        let value = conn
            .get::<_, Option<String>>(key)
            .await
            .map_err(|e| operation_error("GET", key, e))?;

        match &value {
            Some(_) => debug!("Cache HIT: {}", key),
            None => debug!("Cache MISS: {}", key),
        }

        Ok(value)
    }

    async fn set(&self, key: &str, payload: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.client.clone();

        match ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, payload, ttl.as_secs().max(1))
                .await
                .map_err(|e| operation_error("SETEX", key, e))?,
            None => conn
                .set::<_, _, ()>(key, payload)
                .await
                .map_err(|e| operation_error("SET", key, e))?,
        }

        debug!("Cache SET: {} (TTL: {:?})", key, ttl);
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.client.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| operation_error("SCAN", pattern, e))?;

            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once across iterations.
        keys.sort_unstable();
        keys.dedup();

        debug!("Cache SCAN: {} -> {} keys", pattern, keys.len());
        Ok(keys)
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.client.clone();
        let deleted = conn
            .del::<_, u64>(keys)
            .await
            .map_err(|e| operation_error("DEL", &format!("{} keys", keys.len()), e))?;

        debug!("Cache DEL: {} keys", deleted);
        Ok(deleted)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
