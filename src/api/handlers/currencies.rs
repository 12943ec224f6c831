//! Handlers for currency rate queries.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::currencies::CurrencyQueryParams;
use crate::application::services::QueryResult;
use crate::domain::entities::ALL_CURRENCIES;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::currency_code::validate_code;

/// Response header reporting whether the body came from the cache.
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache");

/// Returns the history of every currency.
///
/// # Endpoint
///
/// `GET /api/v1/currencies`
///
/// # Query Parameters
///
/// - `finit` (optional): Range start, inclusive (RFC 3339 or `YYYY-MM-DD`)
/// - `fend` (optional): Range end, inclusive (RFC 3339 or `YYYY-MM-DD`)
///
/// # Response
///
/// ```json
/// [
///   { "code": "EUR", "values": [{ "date": "2024-02-19T12:00:00Z", "value": 0.92 }] },
///   { "code": "USD", "values": [{ "date": "2024-02-19T12:00:00Z", "value": 1.0 }] }
/// ]
/// ```
///
/// # Errors
///
/// - 400 Bad Request for a malformed bound
/// - 404 Not Found when no observation matches
pub async fn list_currencies_handler(
    State(state): State<AppState>,
    Query(params): Query<CurrencyQueryParams>,
) -> Result<Response, AppError> {
    resolve(&state, ALL_CURRENCIES, &params).await
}

/// Returns the history of a single currency.
///
/// # Endpoint
///
/// `GET /api/v1/currencies/{code}`
///
/// `code` is case-insensitive. `ALL` is accepted and behaves like
/// [`list_currencies_handler`].
///
/// # Errors
///
/// - 400 Bad Request for a malformed code or bound
/// - 404 Not Found when no observation matches
pub async fn currency_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(params): Query<CurrencyQueryParams>,
) -> Result<Response, AppError> {
    validate_code(&code)?;
    resolve(&state, &code, &params).await
}

async fn resolve(
    state: &AppState,
    code: &str,
    params: &CurrencyQueryParams,
) -> Result<Response, AppError> {
    let (from, to) = params.date_range()?;

    match state.rate_service.resolve(code, from, to).await? {
        QueryResult::Found { from_cache, data } => {
            let cache_status = if from_cache { "HIT" } else { "MISS" };
            Ok((
                [(CACHE_STATUS_HEADER, HeaderValue::from_static(cache_status))],
                Json(data),
            )
                .into_response())
        }
        QueryResult::NotFound => Err(AppError::not_found(
            "currency not found",
            json!({ "code": code.trim().to_uppercase() }),
        )),
    }
}
