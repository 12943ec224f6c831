//! Repository trait for currency observations.

use crate::domain::entities::{CurrencyObservation, NewObservation};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Per-code summary used by the admin tooling.
#[derive(Debug, Clone)]
pub struct CodeStats {
    pub code: String,
    pub observations: i64,
    pub latest_observed_at: Option<DateTime<Utc>>,
}

/// Filter criteria for observation queries.
///
/// Bounds are inclusive. A missing `code` selects every currency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationFilter {
    pub code: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

impl ObservationFilter {
    /// Selects observations of every currency.
    pub fn all() -> Self {
        Self::default()
    }

    /// Selects observations of a single currency code.
    pub fn for_code(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            ..Self::default()
        }
    }

    /// Adds date range filtering to the query.
    pub fn with_date_range(
        mut self,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.from_date = from_date;
        self.to_date = to_date;
        self
    }
}

/// Repository interface for currency observations.
///
/// Only the ingestion daemon writes; query paths are read-only.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRateRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_rates.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateRepository: Send + Sync {
    /// Inserts a batch of observations inside one transaction.
    ///
    /// Either every row is committed or none is: a failure on any row rolls
    /// back the whole batch.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert_batch(&self, observations: Vec<NewObservation>) -> Result<u64, AppError>;

    /// Retrieves observations matching the filter in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_observations(
        &self,
        filter: ObservationFilter,
    ) -> Result<Vec<CurrencyObservation>, AppError>;

    /// Counts all stored observations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_observations(&self) -> Result<i64, AppError>;

    /// Summarizes stored observations per currency code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn stats_by_code(&self) -> Result<Vec<CodeStats>, AppError>;

    /// Round-trips a trivial query to confirm the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the store cannot be reached.
    async fn ping(&self) -> Result<(), AppError>;
}
