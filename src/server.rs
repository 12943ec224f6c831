//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, ingestion worker spawning, and
//! Axum server lifecycle.

use crate::application::ingestion_worker::spawn_ingestion_worker;
use crate::application::services::{IngestionService, IngestionStatus, RateService};
use crate::config::Config;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::PgRateRepository;
use crate::infrastructure::provider::CurrencyApiClient;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tokio_util::sync::CancellationToken;

/// Delay between startup connection attempts.
const DB_RETRY_INTERVAL_MS: u64 = 3000;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (retried at startup)
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Currency API client
/// - Background ingestion worker
/// - Axum HTTP server
///
/// On Ctrl-C the server stops accepting connections, the ingestion worker
/// is cancelled, and the function returns once it has stopped.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails after all attempts
/// - Migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let cache = connect_cache(&config).await;

    let provider = CurrencyApiClient::new(
        config.provider_timeout(),
        config.provider_endpoint.clone(),
        config.provider_api_key.clone(),
    )
    .context("Failed to build currency API client")?;

    let rate_repository = Arc::new(PgRateRepository::new(Arc::new(pool)));
    let ingestion_status = IngestionStatus::new();

    let ingestion_service = Arc::new(IngestionService::new(
        rate_repository.clone(),
        Arc::new(provider),
        cache.clone(),
        ingestion_status.clone(),
    ));

    let shutdown = CancellationToken::new();
    let worker = spawn_ingestion_worker(
        ingestion_service,
        config.daemon_wakeup(),
        shutdown.child_token(),
    );

    let rate_service = Arc::new(RateService::new(
        rate_repository,
        cache.clone(),
        ingestion_status.epoch().clone(),
    ));
    let state = AppState::new(rate_service, cache, ingestion_status);

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    let signal_token = shutdown.clone();
    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("Shutdown signal received");
        signal_token.cancel();
    })
    .await?;

    shutdown.cancel();
    if let Err(e) = worker.await {
        tracing::error!("Ingestion worker terminated abnormally: {}", e);
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Opens the connection pool, retrying a fixed number of times.
async fn connect_database(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = FixedInterval::from_millis(DB_RETRY_INTERVAL_MS)
        .take(config.db_connect_retries.saturating_sub(1));

    Retry::spawn(strategy, || {
        let options = options.clone();
        async move {
            options
                .connect(&config.database_url)
                .await
                .inspect_err(|e| tracing::warn!("Database connection attempt failed: {}", e))
        }
    })
    .await
    .with_context(|| {
        format!(
            "Failed to connect to database after {} attempts",
            config.db_connect_retries
        )
    })
}

/// Connects to Redis when configured, falling back to [`NullCache`].
async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    }
}
