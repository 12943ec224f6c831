//! Process-local cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
    payload: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-memory cache with Redis-style glob enumeration.
///
/// Backs tests and local tooling. Failures can be switched on per operation
/// kind to exercise the degraded paths of callers.
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_enumeration: AtomicBool,
    writes: AtomicU64,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `get` fail until switched off.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes `set` fail until switched off.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes `keys` and `delete` fail until switched off.
    pub fn set_fail_enumeration(&self, fail: bool) {
        self.fail_enumeration.store(fail, Ordering::SeqCst);
    }

    /// Number of `set` calls served, including failed ones.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .is_some_and(|entry| entry.is_live(now))
    }

    fn check(flag: &AtomicBool, op: &str) -> CacheResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(CacheError::OperationError(format!(
                "injected {} failure",
                op
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheService for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Self::check(&self.fail_reads, "GET")?;

        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.payload.clone()))
    }

    async fn set(&self, key: &str, payload: &str, ttl: Option<Duration>) -> CacheResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_writes, "SET")?;

        let entry = Entry {
            payload: payload.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        Self::check(&self.fail_enumeration, "SCAN")?;

        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|(key, entry)| entry.is_live(now) && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        Self::check(&self.fail_enumeration, "DEL")?;

        let mut entries = self.entries.write().await;
        Ok(keys.iter().filter(|key| entries.remove(*key).is_some()).count() as u64)
    }

    async fn health_check(&self) -> bool {
        !self.fail_reads.load(Ordering::SeqCst)
    }
}

/// Matches `text` against a glob supporting `*` (any run) and `?` (one char).
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut resume = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            resume = t;
            p += 1;
        } else if let Some(star_pos) = star {
            p = star_pos + 1;
            resume += 1;
            t = resume;
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("currencies:*", "currencies:USD:from=*:to=*"));
        assert!(glob_match("currencies:*", "currencies:"));
        assert!(!glob_match("currencies:*", "sessions:abc"));
        assert!(glob_match("a?c", "abc"));
        assert!(!glob_match("a?c", "ac"));
        assert!(glob_match("*USD*", "currencies:USD:from=*:to=*"));
        assert!(glob_match("*", ""));
    }

    #[tokio::test]
    async fn test_set_get_and_enumerate() {
        let cache = InMemoryCache::new();
        cache.set("currencies:USD", "[1]", None).await.unwrap();
        cache.set("currencies:EUR", "[2]", None).await.unwrap();
        cache.set("other:key", "x", None).await.unwrap();

        assert_eq!(cache.get("currencies:USD").await.unwrap().as_deref(), Some("[1]"));
        assert_eq!(
            cache.keys("currencies:*").await.unwrap(),
            vec!["currencies:EUR".to_string(), "currencies:USD".to_string()]
        );
        assert_eq!(cache.write_count(), 3);
    }

    #[tokio::test]
    async fn test_delete_counts_existing_keys() {
        let cache = InMemoryCache::new();
        cache.set("currencies:USD", "[1]", None).await.unwrap();

        let deleted = cache
            .delete(&["currencies:USD".to_string(), "currencies:GBP".to_string()])
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_entries_are_invisible() {
        let cache = InMemoryCache::new();
        cache
            .set("currencies:USD", "[1]", Some(Duration::from_millis(1)))
            .await
            .unwrap();
        std::thread::sleep(Duration::from_millis(5));

        assert!(cache.get("currencies:USD").await.unwrap().is_none());
        assert!(!cache.contains("currencies:USD").await);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let cache = InMemoryCache::new();

        cache.set_fail_writes(true);
        assert!(cache.set("k", "v", None).await.is_err());
        cache.set_fail_writes(false);
        cache.set("k", "v", None).await.unwrap();

        cache.set_fail_reads(true);
        assert!(cache.get("k").await.is_err());
        assert!(!cache.health_check().await);
        cache.set_fail_reads(false);

        cache.set_fail_enumeration(true);
        assert!(cache.keys("*").await.is_err());
        assert!(cache.delete(&["k".to_string()]).await.is_err());
    }
}
