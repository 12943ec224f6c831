mod common;

use common::{at, count_rows, insert_observation, provider_body};
use async_trait::async_trait;
use currency_rates::application::services::{
    CycleStage, IngestionService, IngestionStatus, QueryResult, RateService,
};
use currency_rates::domain::entities::{CurrencyObservation, NewObservation};
use currency_rates::domain::repositories::{CodeStats, ObservationFilter, RateRepository};
use currency_rates::error::AppError;
use currency_rates::infrastructure::cache::{CacheService, InMemoryCache};
use currency_rates::infrastructure::persistence::PgRateRepository;
use currency_rates::infrastructure::provider::CurrencyApiClient;
use currency_rates::utils::cache_key::build_cache_key;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    ingestion: IngestionService<PgRateRepository, CurrencyApiClient>,
    rates: RateService<PgRateRepository>,
    cache: Arc<InMemoryCache>,
}

fn harness(pool: PgPool, server: &MockServer) -> Harness {
    let repository = Arc::new(PgRateRepository::new(Arc::new(pool)));
    let cache = Arc::new(InMemoryCache::new());
    let status = IngestionStatus::new();

    Harness {
        ingestion: IngestionService::new(
            repository.clone(),
            Arc::new(client(server)),
            cache.clone(),
            status.clone(),
        ),
        rates: RateService::new(repository, cache.clone(), status.epoch().clone()),
        cache,
    }
}

fn client(server: &MockServer) -> CurrencyApiClient {
    CurrencyApiClient::new(
        Duration::from_millis(500),
        Some(server.uri()),
        Some("test-key".to_string()),
    )
    .unwrap()
}

/// Holds every store read after its rows are loaded until released.
struct GatedRepository {
    inner: PgRateRepository,
    reached: Arc<Notify>,
    gate: Arc<Notify>,
}

#[async_trait]
impl RateRepository for GatedRepository {
    async fn insert_batch(&self, observations: Vec<NewObservation>) -> Result<u64, AppError> {
        self.inner.insert_batch(observations).await
    }

    async fn find_observations(
        &self,
        filter: ObservationFilter,
    ) -> Result<Vec<CurrencyObservation>, AppError> {
        let rows = self.inner.find_observations(filter).await?;
        self.reached.notify_one();
        self.gate.notified().await;
        Ok(rows)
    }

    async fn count_observations(&self) -> Result<i64, AppError> {
        self.inner.count_observations().await
    }

    async fn stats_by_code(&self) -> Result<Vec<CodeStats>, AppError> {
        self.inner.stats_by_code().await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.inner.ping().await
    }
}

#[sqlx::test]
async fn test_cycle_persists_and_invalidates_unrelated_queries(pool: PgPool) {
    insert_observation(&pool, "USD", 1.0, at(1, 1, 0)).await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(provider_body(&[("USD", 1.05), ("EUR", 0.92)])),
        )
        .mount(&server)
        .await;

    let h = harness(pool.clone(), &server);

    // Hydrate a USD entry plus an entry the snapshot does not mention.
    h.rates.resolve("USD", None, None).await.unwrap();
    h.cache
        .set(&build_cache_key("JPY", Some(at(1, 1, 0)), None), "[]", None)
        .await
        .unwrap();
    assert_eq!(h.cache.len().await, 2);

    let report = h.ingestion.run_cycle().await.unwrap();

    assert_eq!(report.inserted, 2);
    assert_eq!(report.invalidated, 2);
    assert!(h.cache.is_empty().await);
    assert_eq!(count_rows(&pool).await, 3);

    match h.rates.resolve("USD", None, None).await.unwrap() {
        QueryResult::Found { from_cache, data } => {
            assert!(!from_cache);
            assert_eq!(data[0].values.len(), 2);
            assert_eq!(data[0].values[1].value, 1.05);
        }
        QueryResult::NotFound => panic!("expected data"),
    }
}

#[sqlx::test]
async fn test_provider_error_changes_nothing(pool: PgPool) {
    insert_observation(&pool, "USD", 1.0, at(1, 1, 0)).await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let h = harness(pool.clone(), &server);
    h.rates.resolve("USD", None, None).await.unwrap();

    let err = h.ingestion.run_cycle().await.unwrap_err();

    assert_eq!(err.stage(), CycleStage::Fetching);
    assert_eq!(count_rows(&pool).await, 1);
    assert_eq!(h.cache.len().await, 1);

    let status = h.ingestion.status().snapshot();
    assert_eq!(status.failures, 1);
    assert!(status.last_error.is_some());
}

#[sqlx::test]
async fn test_timeout_changes_nothing(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_body(&[("USD", 1.0)]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let h = harness(pool.clone(), &server);

    let err = h.ingestion.run_cycle().await.unwrap_err();

    assert_eq!(err.stage(), CycleStage::Fetching);
    assert_eq!(count_rows(&pool).await, 0);
}

#[sqlx::test]
async fn test_observations_share_fetch_timestamp(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_body(&[("USD", 1.0), ("EUR", 0.92), ("MXN", 17.05)])),
        )
        .mount(&server)
        .await;

    let h = harness(pool.clone(), &server);
    let report = h.ingestion.run_cycle().await.unwrap();

    let distinct: Vec<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT DISTINCT observed_at FROM currency")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert_eq!(distinct, vec![report.observed_at]);
}

#[sqlx::test]
async fn test_query_overlapping_a_cycle_does_not_cache_stale_rows(pool: PgPool) {
    insert_observation(&pool, "USD", 1.0, at(1, 1, 0)).await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_body(&[("USD", 2.0)])))
        .mount(&server)
        .await;

    let pool_arc = Arc::new(pool.clone());
    let cache = Arc::new(InMemoryCache::new());
    let status = IngestionStatus::new();

    let reached = Arc::new(Notify::new());
    let gate = Arc::new(Notify::new());
    let gated = Arc::new(RateService::new(
        Arc::new(GatedRepository {
            inner: PgRateRepository::new(pool_arc.clone()),
            reached: reached.clone(),
            gate: gate.clone(),
        }),
        cache.clone(),
        status.epoch().clone(),
    ));

    let ingestion = IngestionService::new(
        Arc::new(PgRateRepository::new(pool_arc.clone())),
        Arc::new(client(&server)),
        cache.clone(),
        status.clone(),
    );

    // The query loads the pre-cycle rows, then the cycle commits and invalidates.
    let query = tokio::spawn({
        let gated = gated.clone();
        async move { gated.resolve("USD", None, None).await }
    });
    reached.notified().await;

    let report = ingestion.run_cycle().await.unwrap();
    assert_eq!(report.inserted, 1);

    gate.notify_one();
    match query.await.unwrap().unwrap() {
        QueryResult::Found { from_cache, data } => {
            assert!(!from_cache);
            assert_eq!(data[0].values.len(), 1);
        }
        QueryResult::NotFound => panic!("expected data"),
    }

    assert!(cache.is_empty().await);

    let fresh = RateService::new(
        Arc::new(PgRateRepository::new(pool_arc)),
        cache.clone(),
        status.epoch().clone(),
    );
    match fresh.resolve("USD", None, None).await.unwrap() {
        QueryResult::Found { from_cache, data } => {
            assert!(!from_cache);
            assert_eq!(data[0].values.len(), 2);
            assert_eq!(data[0].values[1].value, 2.0);
        }
        QueryResult::NotFound => panic!("expected data"),
    }
}
