//! Cached currency query resolution.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::entities::{CurrencySeries, RateQuery, group_by_code};
use crate::domain::repositories::RateRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, InvalidationEpoch};

/// Outcome of a resolved currency query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Found {
        from_cache: bool,
        data: Vec<CurrencySeries>,
    },
    NotFound,
}

/// Service resolving currency queries through the cache and the store.
///
/// Reads the cache first and falls back to the repository on a miss, a cache
/// error or an undecodable payload. Non-empty results are written back with
/// no expiry; they live until the next ingestion cycle invalidates them.
/// Empty results are never cached.
///
/// A result is only written back while the [`InvalidationEpoch`] still holds
/// the value seen before the store read. If a cycle commits in between, the
/// result is returned but not cached.
pub struct RateService<R: RateRepository> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    epoch: InvalidationEpoch,
}

impl<R: RateRepository> RateService<R> {
    /// Creates a new rate service.
    ///
    /// `epoch` must be the one advanced by the ingestion daemon, usually
    /// [`IngestionStatus::epoch`](crate::application::services::IngestionStatus::epoch).
    pub fn new(
        repository: Arc<R>,
        cache: Arc<dyn CacheService>,
        epoch: InvalidationEpoch,
    ) -> Self {
        Self {
            repository,
            cache,
            epoch,
        }
    }

    /// Resolves a currency query.
    ///
    /// `code` is upper-cased before use; `ALL` selects every currency. Bounds
    /// are inclusive and each one is optional.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the store read fails. Cache
    /// failures are never returned.
    pub async fn resolve(
        &self,
        code: &str,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> Result<QueryResult, AppError> {
        self.resolve_query(&RateQuery::new(code, from_date, to_date))
            .await
    }

    /// Resolves an already normalized query.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve`].
    pub async fn resolve_query(&self, query: &RateQuery) -> Result<QueryResult, AppError> {
        let key = query.cache_key();

        if let Some(data) = self.read_cached(&key).await {
            metrics::counter!("rates_cache_hits_total").increment(1);
            return Ok(QueryResult::Found {
                from_cache: true,
                data,
            });
        }
        metrics::counter!("rates_cache_misses_total").increment(1);

        let read_epoch = self.epoch.current();
        let observations = self.repository.find_observations(query.to_filter()).await?;

        if observations.is_empty() {
            debug!("No observations for {}", key);
            return Ok(QueryResult::NotFound);
        }

        let data = group_by_code(observations);
        self.write_back(&key, &data, read_epoch).await;

        Ok(QueryResult::Found {
            from_cache: false,
            data,
        })
    }

    /// Checks that the store answers queries. Used by the health check.
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    async fn read_cached(&self, key: &str) -> Option<Vec<CurrencySeries>> {
        let payload = match self.cache.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("Cache MISS for {}", key);
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for {}, falling back to database: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(data) => {
                debug!("Cache HIT for {}", key);
                Some(data)
            }
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    async fn write_back(&self, key: &str, data: &[CurrencySeries], read_epoch: u64) {
        if self.epoch.current() != read_epoch {
            debug!("Skipping write-back for {}, invalidated during read", key);
            return;
        }

        let payload = match serde_json::to_string(data) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize result for {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.cache.set(key, &payload, None).await {
            warn!("Failed to cache result for {}: {}", key, e);
            return;
        }

        // A cycle may have invalidated between the check above and the SET.
        if self.epoch.current() != read_epoch {
            debug!("Dropping write-back for {}, invalidated during write", key);
            if let Err(e) = self.cache.delete(&[key.to_string()]).await {
                warn!("Failed to drop stale write-back {}: {}", key, e);
            }
        }
    }
}
