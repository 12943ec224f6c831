//! Global invalidation of cached currency query results.

use super::service::{CacheResult, CacheService};
use crate::utils::cache_key::namespace_pattern;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Counter advanced every time committed data makes cached results stale.
///
/// Writers advance it after their transaction commits and before deleting
/// keys. Readers capture it before reading the store and only cache their
/// result while it is unchanged, so a result read before a commit cannot be
/// written back after that commit's invalidation has run.
#[derive(Debug, Clone, Default)]
pub struct InvalidationEpoch {
    value: Arc<AtomicU64>,
}

impl InvalidationEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Marks every result read before this call as stale.
    pub fn advance(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Deletes every cached currency query result.
///
/// Invalidation is global rather than per code: a new snapshot changes the
/// `ALL` aggregate and every open-ended range, so no cached result is safe
/// to keep. Keys outside the currency namespace are left untouched.
///
/// # Errors
///
/// Returns the cache error if enumeration or deletion fails. Entries that were
/// not deleted stay cached until the next successful invalidation.
pub async fn invalidate_rate_queries(cache: &dyn CacheService) -> CacheResult<u64> {
    let pattern = namespace_pattern();
    let keys = cache.keys(&pattern).await?;

    if keys.is_empty() {
        debug!("No cached currency queries to invalidate");
        return Ok(0);
    }

    let deleted = cache.delete(&keys).await?;
    debug!("Invalidated {} cached currency queries", deleted);

    Ok(deleted)
}
