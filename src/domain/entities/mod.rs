//! Core domain entities for the currency rates service.
//!
//! # Entity Types
//!
//! - [`CurrencyObservation`] - One stored `(code, value, timestamp)` record
//! - [`ProviderSnapshot`] - The rates returned by a single provider fetch
//! - [`CurrencySeries`] - Observations grouped by code, the shape returned to callers
//! - [`RateQuery`] - A normalized query used for cache keys and store filters
//!
//! Creation inputs use separate structs (`NewObservation`), following the
//! same split as the persisted entity.

pub mod observation;
pub mod rate_query;
pub mod series;
pub mod snapshot;

pub use observation::{CurrencyObservation, NewObservation};
pub use rate_query::{ALL_CURRENCIES, RateQuery};
pub use series::{CurrencySeries, RatePoint, group_by_code};
pub use snapshot::ProviderSnapshot;
