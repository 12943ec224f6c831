//! Validation of currency codes supplied by callers.

use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

use crate::error::AppError;

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,10}$").expect("valid currency code regex"));

/// Validates a currency code from a request path.
///
/// Codes are 1-10 ASCII alphanumerics. Case is not checked here; the query
/// resolver upper-cases codes before use.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for empty or malformed codes.
pub fn validate_code(code: &str) -> Result<(), AppError> {
    if code.trim().is_empty() {
        return Err(AppError::bad_request(
            "Currency code must not be empty",
            json!({}),
        ));
    }

    if !CODE_RE.is_match(code) {
        return Err(AppError::bad_request(
            "Invalid currency code",
            json!({ "code": code, "expected": "1-10 alphanumeric characters" }),
        ));
    }

    Ok(())
}
