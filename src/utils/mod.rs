//! Helper functions shared across the service.
//!
//! - [`cache_key`] - Cache key derivation and the currency key namespace
//! - [`date_param`] - Parsing of range bounds from query strings
//! - [`currency_code`] - Currency code validation

pub mod cache_key;
pub mod currency_code;
pub mod date_param;
