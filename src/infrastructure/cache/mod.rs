//! Caching layer for currency query results.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`InMemoryCache`] - Process-local cache used by tests and tooling
//! - [`NullCache`] - No-op implementation for disabled caching
//!
//! [`invalidate_rate_queries`] drops every cached query result after ingestion;
//! [`InvalidationEpoch`] keeps in-flight reads from re-caching stale results.

mod invalidation;
mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use invalidation::{InvalidationEpoch, invalidate_rate_queries};
pub use memory_cache::InMemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};
