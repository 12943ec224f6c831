//! DTOs for currency rate queries.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::utils::date_param::parse_optional_bound;

/// Query string accepted by the currency endpoints.
///
/// Both bounds are optional and inclusive. Values are kept as raw strings so
/// a malformed bound produces a validation error naming the parameter rather
/// than a generic deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct CurrencyQueryParams {
    /// Range start (RFC 3339 or `YYYY-MM-DD`).
    #[serde(default)]
    pub finit: Option<String>,

    /// Range end (RFC 3339 or `YYYY-MM-DD`).
    #[serde(default)]
    pub fend: Option<String>,
}

impl CurrencyQueryParams {
    /// Parses both bounds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when either bound is malformed or
    /// when the start lies after the end.
    pub fn date_range(&self) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), AppError> {
        let from = parse_optional_bound(self.finit.as_deref()).map_err(|reason| {
            AppError::bad_request(
                "Invalid start date format",
                json!({ "param": "finit", "reason": reason }),
            )
        })?;

        let to = parse_optional_bound(self.fend.as_deref()).map_err(|reason| {
            AppError::bad_request(
                "Invalid end date format",
                json!({ "param": "fend", "reason": reason }),
            )
        })?;

        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(AppError::bad_request(
                "Start date must not be after end date",
                json!({ "finit": from, "fend": to }),
            ));
        }

        Ok((from, to))
    }
}
