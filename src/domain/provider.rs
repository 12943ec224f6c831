//! Contract for the external currency-rates provider.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::ProviderSnapshot;

/// Errors raised while fetching a snapshot.
///
/// Every variant is transient from the daemon's point of view: the cycle is
/// aborted and the next tick retries.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider endpoint or API key is not configured")]
    NotConfigured,
    #[error("provider request timed out: {0}")]
    Timeout(String),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("unexpected provider response status: {0}")]
    Status(u16),
    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

/// Source of currency rate snapshots.
///
/// # Implementations
///
/// - [`crate::infrastructure::provider::CurrencyApiClient`] - HTTP client for the rates API
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatesProvider: Send + Sync {
    /// Fetches the latest rates with a single bounded request.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on missing configuration, transport failure,
    /// timeout, non-2xx status, or a body that does not match the expected shape.
    async fn fetch_latest(&self) -> Result<ProviderSnapshot, ProviderError>;
}
