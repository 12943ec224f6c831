//! Provider snapshot: the rates returned by one provider fetch.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::observation::NewObservation;

/// Transient result of one fetch cycle.
///
/// Lives only for the duration of a single ingestion cycle and is consumed
/// into a batch of [`NewObservation`] rows sharing `fetched_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSnapshot {
    pub fetched_at: DateTime<Utc>,
    /// `meta.last_updated_at` as reported by the provider.
    pub provider_updated_at: DateTime<Utc>,
    pub rates: BTreeMap<String, f64>,
}

impl ProviderSnapshot {
    pub fn new(
        fetched_at: DateTime<Utc>,
        provider_updated_at: DateTime<Utc>,
        rates: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            fetched_at,
            provider_updated_at,
            rates,
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Converts the snapshot into insertable rows, one per `(code, rate)` pair.
    ///
    /// Every row carries the snapshot's `fetched_at` as its `observed_at`.
    pub fn into_observations(self) -> Vec<NewObservation> {
        let observed_at = self.fetched_at;
        self.rates
            .into_iter()
            .map(|(code, value)| NewObservation {
                code,
                value,
                observed_at,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_observations_share_fetch_timestamp() {
        let fetched_at = Utc.with_ymd_and_hms(2024, 2, 19, 15, 30, 0).unwrap();
        let rates = BTreeMap::from([("USD".to_string(), 1.0), ("MXN".to_string(), 17.05)]);
        let snapshot = ProviderSnapshot::new(fetched_at, fetched_at, rates);

        assert_eq!(snapshot.len(), 2);

        let observations = snapshot.into_observations();
        assert_eq!(observations.len(), 2);
        assert!(observations.iter().all(|o| o.observed_at == fetched_at));
        assert_eq!(observations[0].code, "MXN");
        assert_eq!(observations[1].code, "USD");
    }

    #[test]
    fn test_empty_snapshot() {
        let now = Utc::now();
        let snapshot = ProviderSnapshot::new(now, now, BTreeMap::new());

        assert!(snapshot.is_empty());
        assert!(snapshot.into_observations().is_empty());
    }
}
