//! Shared application state injected into all HTTP handlers.

use std::sync::Arc;

use crate::application::services::{IngestionStatus, RateService};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::PgRateRepository;

/// Application state shared across all request handlers.
///
/// Cloned per request by Axum; every field is an `Arc` or wraps one.
#[derive(Clone)]
pub struct AppState {
    pub rate_service: Arc<RateService<PgRateRepository>>,
    pub cache: Arc<dyn CacheService>,
    /// Progress of the background ingestion worker, reported by `/health`.
    pub ingestion_status: IngestionStatus,
}

impl AppState {
    pub fn new(
        rate_service: Arc<RateService<PgRateRepository>>,
        cache: Arc<dyn CacheService>,
        ingestion_status: IngestionStatus,
    ) -> Self {
        Self {
            rate_service,
            cache,
            ingestion_status,
        }
    }
}
