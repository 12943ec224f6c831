//! Application layer services implementing business logic.
//!
//! Services consume the domain contracts (repositories, provider) and the
//! cache, and expose the two entry points of the core:
//!
//! - [`services::rate_service::RateService`] - Cached currency query resolution
//! - [`services::ingestion_service::IngestionService`] - One fetch/persist/invalidate cycle
//! - [`ingestion_worker`] - The timer loop driving ingestion cycles

pub mod ingestion_worker;
pub mod services;
