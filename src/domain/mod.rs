//! Domain layer containing business entities and contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures (observations, snapshots, query shapes)
//! - [`repositories`] - Data access trait definitions
//! - [`provider`] - External rates provider contract
//!
//! # Ingestion Flow
//!
//! 1. The ingestion worker wakes on a fixed interval
//! 2. A [`provider::RatesProvider`] returns an [`entities::ProviderSnapshot`]
//! 3. The snapshot is persisted as one batch via [`repositories::RateRepository`]
//! 4. Cached query results are invalidated

pub mod entities;
pub mod provider;
pub mod repositories;
