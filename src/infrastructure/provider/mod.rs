//! Clients for external rate providers.
//!
//! - [`CurrencyApiClient`] - HTTP client for the currency rates API

mod currency_api_client;

pub use currency_api_client::CurrencyApiClient;
