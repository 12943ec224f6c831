//! One ingestion cycle: fetch, persist, invalidate.

use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::provider::{ProviderError, RatesProvider};
use crate::domain::repositories::RateRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{
    CacheError, CacheService, InvalidationEpoch, invalidate_rate_queries,
};

/// Phase of the ingestion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Idle,
    Fetching,
    Persisting,
    Invalidating,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Persisting => "persisting",
            Self::Invalidating => "invalidating",
        };
        f.write_str(name)
    }
}

/// Why a cycle was aborted.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Nothing was written.
    #[error("fetch failed: {0}")]
    Fetch(#[from] ProviderError),
    /// The transaction was rolled back; the store is unchanged.
    #[error("persist failed: {0}")]
    Persist(#[source] AppError),
    /// The snapshot is committed but stale cache entries may remain.
    #[error("cache invalidation failed: {0}")]
    Invalidate(#[source] CacheError),
}

impl IngestionError {
    pub fn stage(&self) -> CycleStage {
        match self {
            Self::Fetch(_) => CycleStage::Fetching,
            Self::Persist(_) => CycleStage::Persisting,
            Self::Invalidate(_) => CycleStage::Invalidating,
        }
    }
}

/// Summary of a successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub inserted: u64,
    pub invalidated: u64,
    pub observed_at: DateTime<Utc>,
    pub provider_updated_at: DateTime<Utc>,
}

/// Point-in-time view of the daemon for health reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionSnapshot {
    pub stage: CycleStage,
    pub cycles: u64,
    pub failures: u64,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl Default for IngestionSnapshot {
    fn default() -> Self {
        Self {
            stage: CycleStage::Idle,
            cycles: 0,
            failures: 0,
            last_success_at: None,
            last_error: None,
        }
    }
}

/// Shared, cloneable handle on the daemon's progress.
///
/// Also carries the [`InvalidationEpoch`] the daemon advances on every
/// commit; the query resolver must be built from the same handle.
#[derive(Debug, Clone, Default)]
pub struct IngestionStatus {
    inner: Arc<RwLock<IngestionSnapshot>>,
    epoch: InvalidationEpoch,
}

impl IngestionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> &InvalidationEpoch {
        &self.epoch
    }

    pub fn snapshot(&self) -> IngestionSnapshot {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut IngestionSnapshot)) {
        match self.inner.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    fn enter(&self, stage: CycleStage) {
        debug!("Ingestion stage: {}", stage);
        self.update(|s| s.stage = stage);
    }

    fn finish(&self, result: &Result<CycleReport, IngestionError>) {
        self.update(|s| {
            s.stage = CycleStage::Idle;
            s.cycles += 1;
            match result {
                Ok(report) => {
                    s.last_success_at = Some(report.observed_at);
                    s.last_error = None;
                }
                Err(e) => {
                    s.failures += 1;
                    s.last_error = Some(e.to_string());
                }
            }
        });
    }
}

/// Runs ingestion cycles against a provider, the store and the cache.
///
/// The service holds no scheduling state; [`crate::application::ingestion_worker`]
/// drives it on a timer and guarantees that cycles never overlap.
pub struct IngestionService<R: RateRepository, P: RatesProvider> {
    repository: Arc<R>,
    provider: Arc<P>,
    cache: Arc<dyn CacheService>,
    status: IngestionStatus,
}

impl<R: RateRepository, P: RatesProvider> IngestionService<R, P> {
    /// Creates a new ingestion service.
    pub fn new(
        repository: Arc<R>,
        provider: Arc<P>,
        cache: Arc<dyn CacheService>,
        status: IngestionStatus,
    ) -> Self {
        Self {
            repository,
            provider,
            cache,
            status,
        }
    }

    pub fn status(&self) -> &IngestionStatus {
        &self.status
    }

    /// Runs one full cycle.
    ///
    /// Persistence commits before invalidation starts, and the invalidation
    /// epoch is advanced in between. A snapshot with no rates commits nothing
    /// and skips invalidation.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError`] naming the stage that failed. No stage is
    /// retried within the cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport, IngestionError> {
        let result = self.execute().await;
        self.status.finish(&result);

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => match e.stage() {
                CycleStage::Fetching => "fetch_error",
                CycleStage::Persisting => "persist_error",
                _ => "invalidate_error",
            },
        };
        metrics::counter!("rates_ingestion_cycles_total", "outcome" => outcome).increment(1);

        result
    }

    async fn execute(&self) -> Result<CycleReport, IngestionError> {
        self.status.enter(CycleStage::Fetching);
        let snapshot = self.provider.fetch_latest().await?;

        let observed_at = snapshot.fetched_at;
        let provider_updated_at = snapshot.provider_updated_at;

        if snapshot.is_empty() {
            info!("Provider returned an empty snapshot");
        } else {
            debug!("Fetched {} rates", snapshot.len());
        }

        self.status.enter(CycleStage::Persisting);
        let inserted = self
            .repository
            .insert_batch(snapshot.into_observations())
            .await
            .map_err(IngestionError::Persist)?;
        metrics::counter!("rates_ingested_observations_total").increment(inserted);

        let invalidated = if inserted > 0 {
            self.status.enter(CycleStage::Invalidating);
            self.status.epoch().advance();
            invalidate_rate_queries(self.cache.as_ref())
                .await
                .map_err(IngestionError::Invalidate)?
        } else {
            debug!("Nothing committed, skipping invalidation");
            0
        };

        Ok(CycleReport {
            inserted,
            invalidated,
            observed_at,
            provider_updated_at,
        })
    }
}
