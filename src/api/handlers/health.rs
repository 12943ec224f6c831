//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse, IngestionCheck};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health` and `GET /api/v1/_`
///
/// # Response Codes
///
/// - **200 OK**: Database and cache healthy
/// - **503 Service Unavailable**: Database or cache degraded
///
/// # Components Checked
///
/// 1. **Database**: Runs `SELECT 1`
/// 2. **Cache**: Tests Redis PING
/// 3. **Ingestion**: Reports worker progress (never degrades the status)
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "cache": { "status": "ok", "message": "Cache reachable" },
///     "ingestion": { "status": "ok", "stage": "idle", "cycles": 12, "failures": 0 }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;

    let cache_check = check_cache(&state).await;

    let ingestion_check = check_ingestion(&state);

    let all_healthy = db_check.status == "ok" && cache_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            cache: cache_check,
            ingestion: ingestion_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.rate_service.check_store().await {
        Ok(()) => CheckStatus {
            status: "ok".to_string(),
            message: Some("Connected".to_string()),
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            message: Some(format!("Database error: {}", e)),
        },
    }
}

/// Checks cache connectivity via PING command.
async fn check_cache(state: &AppState) -> CheckStatus {
    if state.cache.health_check().await {
        CheckStatus {
            status: "ok".to_string(),
            message: Some("Cache reachable".to_string()),
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some("Cache connection failed".to_string()),
        }
    }
}

fn check_ingestion(state: &AppState) -> IngestionCheck {
    let snapshot = state.ingestion_status.snapshot();

    let status = match (&snapshot.last_error, snapshot.last_success_at) {
        (Some(_), _) => "failing",
        (None, Some(_)) => "ok",
        (None, None) => "pending",
    };

    IngestionCheck {
        status: status.to_string(),
        stage: snapshot.stage.to_string(),
        cycles: snapshot.cycles,
        failures: snapshot.failures,
        last_success_at: snapshot.last_success_at,
        last_error: snapshot.last_error,
    }
}
