//! PostgreSQL implementation of the observation repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{CurrencyObservation, NewObservation};
use crate::domain::repositories::{CodeStats, ObservationFilter, RateRepository};
use crate::error::AppError;

#[derive(FromRow)]
struct ObservationRow {
    id: i64,
    code: String,
    value: f64,
    observed_at: DateTime<Utc>,
}

impl From<ObservationRow> for CurrencyObservation {
    fn from(row: ObservationRow) -> Self {
        CurrencyObservation::new(row.id, row.code, row.value, row.observed_at)
    }
}

#[derive(FromRow)]
struct CodeStatsRow {
    code: String,
    observations: i64,
    latest_observed_at: Option<DateTime<Utc>>,
}

/// PostgreSQL repository for currency observations.
///
/// Reads are ordered by `id`, which follows insertion order. Writes go
/// through a single transaction per batch.
pub struct PgRateRepository {
    pool: Arc<PgPool>,
}

impl PgRateRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateRepository for PgRateRepository {
    async fn insert_batch(&self, observations: Vec<NewObservation>) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for observation in &observations {
            // Dropping `tx` on an early return rolls the whole batch back.
            let result = sqlx::query(
                r#"
                INSERT INTO currency (code, value, observed_at)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(&observation.code)
            .bind(observation.value)
            .bind(observation.observed_at)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;

        Ok(inserted)
    }

    async fn find_observations(
        &self,
        filter: ObservationFilter,
    ) -> Result<Vec<CurrencyObservation>, AppError> {
        let rows = sqlx::query_as::<_, ObservationRow>(
            r#"
            SELECT id, code, value, observed_at
            FROM currency
            WHERE ($1::text IS NULL OR code = $1)
              AND ($2::timestamptz IS NULL OR observed_at >= $2)
              AND ($3::timestamptz IS NULL OR observed_at <= $3)
            ORDER BY id
            "#,
        )
        .bind(filter.code)
        .bind(filter.from_date)
        .bind(filter.to_date)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(CurrencyObservation::from).collect())
    }

    async fn count_observations(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM currency")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn stats_by_code(&self) -> Result<Vec<CodeStats>, AppError> {
        let rows = sqlx::query_as::<_, CodeStatsRow>(
            r#"
            SELECT code, COUNT(*) AS observations, MAX(observed_at) AS latest_observed_at
            FROM currency
            GROUP BY code
            ORDER BY code
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CodeStats {
                code: r.code,
                observations: r.observations,
                latest_observed_at: r.latest_observed_at,
            })
            .collect())
    }
}
