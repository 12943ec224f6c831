#![allow(dead_code)]

use axum::{Router, routing::get};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use currency_rates::application::services::{IngestionStatus, RateService};
use currency_rates::infrastructure::cache::InMemoryCache;
use currency_rates::infrastructure::persistence::PgRateRepository;
use currency_rates::api::handlers::health_handler;
use currency_rates::api::routes::v1_routes;
use currency_rates::state::AppState;

pub fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, hour, 0, 0).unwrap()
}

pub async fn insert_observation(pool: &PgPool, code: &str, value: f64, observed_at: DateTime<Utc>) {
    sqlx::query("INSERT INTO currency (code, value, observed_at) VALUES ($1, $2, $3)")
        .bind(code)
        .bind(value)
        .bind(observed_at)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn count_rows(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM currency")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Builds application state over an in-memory cache the test can inspect.
pub fn create_test_state(pool: PgPool) -> (AppState, Arc<InMemoryCache>) {
    let repository = Arc::new(PgRateRepository::new(Arc::new(pool)));
    let cache = Arc::new(InMemoryCache::new());

    let status = IngestionStatus::new();
    let rate_service = Arc::new(RateService::new(
        repository,
        cache.clone(),
        status.epoch().clone(),
    ));
    let state = AppState::new(rate_service, cache.clone(), status);

    (state, cache)
}

/// Mirrors the production route table without the outer middleware.
pub fn create_test_app(pool: PgPool) -> (Router, Arc<InMemoryCache>) {
    let (state, cache) = create_test_state(pool);
    let app = Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1", v1_routes())
        .with_state(state);
    (app, cache)
}

/// A provider body in the currency API format.
pub fn provider_body(rates: &[(&str, f64)]) -> serde_json::Value {
    let data: serde_json::Map<String, serde_json::Value> = rates
        .iter()
        .map(|(code, value)| {
            (
                code.to_string(),
                serde_json::json!({ "code": code, "value": value }),
            )
        })
        .collect();

    serde_json::json!({
        "meta": { "last_updated_at": "2024-02-19T23:59:59Z" },
        "data": data,
    })
}
