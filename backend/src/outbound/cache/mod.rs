//! Employee cache adapters.
//!
//! - [`InMemoryEmployeeCache`]: process-local map with per-entry expiry.
//! - [`RedisEmployeeCache`]: shared cache on a `bb8-redis` pool.
//! - [`NoOpEmployeeCache`]: always misses; used when caching is disabled.
//!
//! Both real adapters apply [`CacheTtl`], which adds random jitter to the base
//! lifetime so entries written together do not all expire together.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::domain::ports::{
    CacheNamespace, CachedEmployees, EmployeeCache, EmployeeCacheError, EmployeeCacheKey,
};

mod memory;
mod redis;

pub use memory::InMemoryEmployeeCache;
pub use redis::RedisEmployeeCache;

/// Default entry lifetime before jitter.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Entry lifetime with bounded random jitter.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use employee_backend::outbound::cache::CacheTtl;
///
/// let ttl = CacheTtl::new(Duration::from_secs(100));
/// let sampled = ttl.sample();
/// assert!(sampled >= Duration::from_secs(100));
/// assert!(sampled <= Duration::from_secs(110));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    base: Duration,
    max_jitter: Duration,
}

impl CacheTtl {
    /// Lifetime of `base` plus up to a tenth of it in jitter.
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            max_jitter: base / 10,
        }
    }

    /// Lifetime of exactly `base`.
    pub fn exact(base: Duration) -> Self {
        Self {
            base,
            max_jitter: Duration::ZERO,
        }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    /// Draw one lifetime.
    pub fn sample(&self) -> Duration {
        let jitter_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if jitter_ms == 0 {
            return self.base;
        }
        let extra = rand::thread_rng().gen_range(0..=jitter_ms);
        self.base.saturating_add(Duration::from_millis(extra))
    }
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEmployeeCache;

#[async_trait]
impl EmployeeCache for NoOpEmployeeCache {
    async fn get(
        &self,
        _key: &EmployeeCacheKey,
    ) -> Result<Option<CachedEmployees>, EmployeeCacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _key: &EmployeeCacheKey,
        _value: &CachedEmployees,
    ) -> Result<(), EmployeeCacheError> {
        Ok(())
    }

    async fn evict(&self, _key: &EmployeeCacheKey) -> Result<(), EmployeeCacheError> {
        Ok(())
    }

    async fn evict_namespace(&self, _namespace: CacheNamespace) -> Result<(), EmployeeCacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmployeeId;
    use crate::test_support::employees::{date, employee};
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_secs(600), Duration::from_secs(660))]
    #[case(Duration::from_millis(5), Duration::from_millis(5))]
    fn sampled_ttl_stays_within_jitter_bound(#[case] base: Duration, #[case] upper: Duration) {
        let ttl = CacheTtl::new(base);
        for _ in 0..50 {
            let sampled = ttl.sample();
            assert!(sampled >= base, "{sampled:?} below base");
            assert!(sampled <= upper, "{sampled:?} above {upper:?}");
        }
    }

    #[rstest]
    fn exact_ttl_never_jitters() {
        let ttl = CacheTtl::exact(Duration::from_secs(30));
        assert_eq!(ttl.sample(), Duration::from_secs(30));
    }

    #[rstest]
    #[tokio::test]
    async fn no_op_cache_always_misses() {
        let cache = NoOpEmployeeCache;
        let record = employee("Ana Lopez", "Engineer", 3000.0, date(2024, 1, 10));
        let key = EmployeeCacheKey::by_id(record.id());

        cache
            .put(&key, &CachedEmployees::One(record))
            .await
            .expect("put succeeds");
        assert_eq!(cache.get(&key).await.expect("get succeeds"), None);
        cache
            .evict(&EmployeeCacheKey::by_id(EmployeeId::random()))
            .await
            .expect("evict succeeds");
    }
}
