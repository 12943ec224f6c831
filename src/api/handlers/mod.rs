//! HTTP request handlers for API endpoints.

pub mod currencies;
pub mod health;

pub use currencies::{currency_handler, list_currencies_handler};
pub use health::health_handler;
