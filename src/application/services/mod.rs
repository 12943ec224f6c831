//! Business logic services for the application layer.

pub mod ingestion_service;
pub mod rate_service;

pub use ingestion_service::{
    CycleReport, CycleStage, IngestionError, IngestionService, IngestionSnapshot, IngestionStatus,
};
pub use rate_service::{QueryResult, RateService};
