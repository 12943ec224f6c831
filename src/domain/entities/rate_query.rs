//! Normalized currency query used for cache keys and store filters.

use chrono::{DateTime, Utc};

use crate::domain::repositories::ObservationFilter;
use crate::utils::cache_key::build_cache_key;

/// Reserved code selecting every currency at once.
pub const ALL_CURRENCIES: &str = "ALL";

/// A currency query with an upper-cased code and optional inclusive bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuery {
    code: String,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
}

impl RateQuery {
    pub fn new(
        code: &str,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            code: code.trim().to_ascii_uppercase(),
            from_date,
            to_date,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn from_date(&self) -> Option<DateTime<Utc>> {
        self.from_date
    }

    pub fn to_date(&self) -> Option<DateTime<Utc>> {
        self.to_date
    }

    /// Returns `true` when the query targets the `ALL` aggregate.
    pub fn is_aggregate(&self) -> bool {
        self.code == ALL_CURRENCIES
    }

    /// Derives the cache key for this query.
    pub fn cache_key(&self) -> String {
        build_cache_key(&self.code, self.from_date, self.to_date)
    }

    /// Builds the store filter matching this query.
    ///
    /// The aggregate drops the code predicate and keeps any bounds.
    pub fn to_filter(&self) -> ObservationFilter {
        let filter = if self.is_aggregate() {
            ObservationFilter::all()
        } else {
            ObservationFilter::for_code(&self.code)
        };

        filter.with_date_range(self.from_date, self.to_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_code_is_uppercased() {
        let query = RateQuery::new("usd", None, None);
        assert_eq!(query.code(), "USD");
        assert_eq!(query.cache_key(), RateQuery::new("USD", None, None).cache_key());
    }

    #[test]
    fn test_aggregate_filter_has_no_code() {
        let query = RateQuery::new("all", None, None);
        assert!(query.is_aggregate());

        let filter = query.to_filter();
        assert!(filter.code.is_none());
        assert!(filter.from_date.is_none());
        assert!(filter.to_date.is_none());
    }

    #[test]
    fn test_code_filter_with_bounds() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let query = RateQuery::new("EUR", Some(from), None);

        let filter = query.to_filter();
        assert_eq!(filter.code.as_deref(), Some("EUR"));
        assert_eq!(filter.from_date, Some(from));
        assert!(filter.to_date.is_none());
    }

    #[test]
    fn test_different_bounds_different_keys() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let open = RateQuery::new("USD", Some(from), None);
        let closed = RateQuery::new("USD", None, Some(from));

        assert_ne!(open.cache_key(), closed.cache_key());
    }
}
