//! API route configuration.

use crate::api::handlers::{currency_handler, health_handler, list_currencies_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Versioned API routes, mounted under `/api/v1`.
///
/// # Endpoints
///
/// - `GET /_`                - Health check
/// - `GET /currencies`       - History of every currency
/// - `GET /currencies/{code}` - History of one currency
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/_", get(health_handler))
        .route("/currencies", get(list_currencies_handler))
        .route("/currencies/{code}", get(currency_handler))
}
