//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the contracts defined by the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis, in-memory and no-op implementations)
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`provider`] - External currency rates API client

pub mod cache;
pub mod persistence;
pub mod provider;
