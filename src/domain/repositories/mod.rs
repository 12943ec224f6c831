//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod rate_repository;

pub use rate_repository::{CodeStats, ObservationFilter, RateRepository};

#[cfg(test)]
pub use rate_repository::MockRateRepository;
