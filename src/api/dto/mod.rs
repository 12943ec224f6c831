//! Data Transfer Objects for API requests and responses.
//!
//! Response bodies for currency queries are the domain
//! [`CurrencySeries`](crate::domain::entities::CurrencySeries) values
//! serialized as-is.

pub mod currencies;
pub mod health;
