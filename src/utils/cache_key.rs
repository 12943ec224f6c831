//! Cache key derivation for currency queries.
//!
//! Every key produced here lives under the [`CACHE_NAMESPACE`] prefix so the
//! ingestion daemon can enumerate and drop all cached query results with a
//! single pattern, without touching unrelated keys.
//!
//! Keys embed canonical timestamps, never the caller's raw query text:
//! `2024-01-01`, `2024-01-01T00:00:00Z` and `2024-01-01T02:00:00+02:00`
//! all produce the same key.

use chrono::{DateTime, SecondsFormat, Utc};

/// Prefix shared by every currency query key.
pub const CACHE_NAMESPACE: &str = "currencies";

const OPEN_BOUND: &str = "*";

/// Builds the cache key for a normalized code and optional bounds.
///
/// Format: `currencies:{CODE}:from={start|*}:to={end|*}`.
pub fn build_cache_key(
    code: &str,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
) -> String {
    format!(
        "{}:{}:from={}:to={}",
        CACHE_NAMESPACE,
        code,
        format_bound(from_date),
        format_bound(to_date)
    )
}

/// Glob pattern matching every key in the currency namespace.
pub fn namespace_pattern() -> String {
    format!("{}:*", CACHE_NAMESPACE)
}

fn format_bound(bound: Option<DateTime<Utc>>) -> String {
    bound
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_else(|| OPEN_BOUND.to_string())
}
