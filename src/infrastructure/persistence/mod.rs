//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgRateRepository`] - Currency observation storage and range queries

pub mod pg_rate_repository;

pub use pg_rate_repository::PgRateRepository;
