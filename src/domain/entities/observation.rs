//! Currency observation entity representing one stored rate.

use chrono::{DateTime, Utc};

/// A single currency rate recorded by one ingestion cycle.
///
/// Observations are append-only: they are never updated after insertion and
/// several observations may share the same `(code, observed_at)` pair when
/// the provider is polled more than once for the same snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyObservation {
    pub id: i64,
    pub code: String,
    pub value: f64,
    pub observed_at: DateTime<Utc>,
}

impl CurrencyObservation {
    /// Creates a new CurrencyObservation instance.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let observation = CurrencyObservation::new(1, "USD".to_string(), 1.0, Utc::now());
    /// ```
    pub fn new(id: i64, code: String, value: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            value,
            observed_at,
        }
    }
}

/// Input data for inserting an observation.
///
/// The `id` is assigned by the database. Values are stored as received from
/// the provider, including zero or negative rates.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObservation {
    pub code: String,
    pub value: f64,
    pub observed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_creation() {
        let now = Utc::now();
        let observation = CurrencyObservation::new(7, "EUR".to_string(), 0.92, now);

        assert_eq!(observation.id, 7);
        assert_eq!(observation.code, "EUR");
        assert_eq!(observation.value, 0.92);
        assert_eq!(observation.observed_at, now);
    }

    #[test]
    fn test_new_observation_keeps_malformed_value() {
        let new_observation = NewObservation {
            code: "XXX".to_string(),
            value: -1.0,
            observed_at: Utc::now(),
        };

        assert_eq!(new_observation.value, -1.0);
    }
}
