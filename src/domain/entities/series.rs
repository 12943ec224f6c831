//! Grouped query result shape returned to callers and stored in cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::observation::CurrencyObservation;

/// One observed value inside a [`CurrencySeries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

/// All observations of a single currency code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySeries {
    pub code: String,
    pub values: Vec<RatePoint>,
}

/// Groups observations by code.
///
/// Groups appear in order of first occurrence and keep the input order
/// within each group, so rows fetched by `id` stay in insertion order.
pub fn group_by_code(observations: Vec<CurrencyObservation>) -> Vec<CurrencySeries> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut series: Vec<CurrencySeries> = Vec::new();

    for observation in observations {
        let point = RatePoint {
            date: observation.observed_at,
            value: observation.value,
        };

        match index.get(&observation.code) {
            Some(&position) => series[position].values.push(point),
            None => {
                index.insert(observation.code.clone(), series.len());
                series.push(CurrencySeries {
                    code: observation.code,
                    values: vec![point],
                });
            }
        }
    }

    series
}
