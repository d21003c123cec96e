//! Process-local employee cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

use super::CacheTtl;
use crate::domain::ports::{
    CacheNamespace, CachedEmployees, EmployeeCache, EmployeeCacheError, EmployeeCacheKey,
};

struct Entry {
    value: CachedEmployees,
    expires_at: DateTime<Utc>,
}

/// `HashMap` cache with per-entry expiry measured on an injected clock.
///
/// Expired entries are dropped when read and swept on every write. When the
/// map is still full after a sweep, the entry closest to expiry makes room.
pub struct InMemoryEmployeeCache {
    entries: Mutex<HashMap<EmployeeCacheKey, Entry>>,
    clock: Arc<dyn Clock>,
    ttl: CacheTtl,
    max_entries: usize,
}

impl InMemoryEmployeeCache {
    /// Default bound on stored entries.
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

    pub fn new(clock: Arc<dyn Clock>, ttl: CacheTtl) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            ttl,
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        }
    }

    /// Bound the number of stored entries. Zero is treated as one.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<EmployeeCacheKey, Entry>>, EmployeeCacheError> {
        self.entries
            .lock()
            .map_err(|_| EmployeeCacheError::backend("in-memory cache lock poisoned"))
    }
}

#[async_trait]
impl EmployeeCache for InMemoryEmployeeCache {
    async fn get(
        &self,
        key: &EmployeeCacheKey,
    ) -> Result<Option<CachedEmployees>, EmployeeCacheError> {
        let now = self.clock.utc();
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &EmployeeCacheKey,
        value: &CachedEmployees,
    ) -> Result<(), EmployeeCacheError> {
        let lifetime = TimeDelta::from_std(self.ttl.sample())
            .map_err(|err| EmployeeCacheError::backend(format!("cache ttl out of range: {err}")))?;
        let now = self.clock.utc();
        let expires_at = now + lifetime;
        let mut entries = self.lock()?;
        entries.retain(|_, entry| entry.expires_at > now);
        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            let soonest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone());
            if let Some(soonest) = soonest {
                entries.remove(&soonest);
            }
        }
        entries.insert(
            key.clone(),
            Entry {
                value: value.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn evict(&self, key: &EmployeeCacheKey) -> Result<(), EmployeeCacheError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn evict_namespace(&self, namespace: CacheNamespace) -> Result<(), EmployeeCacheError> {
        self.lock()?.retain(|key, _| key.namespace() != namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pagination::PageRequest;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::Employee;
    use crate::test_support::employees::{date, employee};
    use crate::test_support::resilience::MutableClock;

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::fixed())
    }

    #[fixture]
    fn ana() -> Employee {
        employee("Ana Lopez", "Engineer", 3000.0, date(2024, 1, 10))
    }

    fn cache(clock: &Arc<MutableClock>) -> InMemoryEmployeeCache {
        InMemoryEmployeeCache::new(clock.clone(), CacheTtl::exact(Duration::from_secs(60)))
    }

    #[rstest]
    #[tokio::test]
    async fn entries_expire_after_ttl(clock: Arc<MutableClock>, ana: Employee) {
        let cache = cache(&clock);
        let key = EmployeeCacheKey::by_id(ana.id());
        cache
            .put(&key, &CachedEmployees::One(ana.clone()))
            .await
            .expect("put");

        clock.advance(Duration::from_secs(59));
        assert_eq!(
            cache.get(&key).await.expect("get"),
            Some(CachedEmployees::One(ana))
        );

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get(&key).await.expect("get"), None);
        assert!(cache.is_empty(), "expired entry should be dropped on read");
    }

    #[rstest]
    #[tokio::test]
    async fn writes_sweep_entries_that_were_never_read_again(
        clock: Arc<MutableClock>,
        ana: Employee,
    ) {
        let cache = cache(&clock);
        for page in 0..5 {
            let key = EmployeeCacheKey::page(PageRequest::new(page, 10).expect("page"));
            cache
                .put(&key, &CachedEmployees::Many(vec![ana.clone()]))
                .await
                .expect("put");
        }
        assert_eq!(cache.len(), 5);

        clock.advance(Duration::from_secs(60));
        cache
            .put(
                &EmployeeCacheKey::by_id(ana.id()),
                &CachedEmployees::One(ana.clone()),
            )
            .await
            .expect("put");

        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn full_cache_drops_the_entry_closest_to_expiry(
        clock: Arc<MutableClock>,
        ana: Employee,
    ) {
        let cache = cache(&clock).with_max_entries(2);
        let keys: Vec<EmployeeCacheKey> = (0..3)
            .map(|page| EmployeeCacheKey::page(PageRequest::new(page, 10).expect("page")))
            .collect();
        for key in &keys {
            cache
                .put(key, &CachedEmployees::Many(vec![ana.clone()]))
                .await
                .expect("put");
            clock.advance(Duration::from_secs(1));
        }

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&keys[0]).await.expect("get"), None);
        assert!(cache.get(&keys[1]).await.expect("get").is_some());
        assert!(cache.get(&keys[2]).await.expect("get").is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn namespace_eviction_keeps_other_namespace(clock: Arc<MutableClock>, ana: Employee) {
        let cache = cache(&clock);
        let by_id = EmployeeCacheKey::by_id(ana.id());
        let first_page = EmployeeCacheKey::page(PageRequest::first());
        let second_page = EmployeeCacheKey::page(PageRequest::new(1, 10).expect("page"));
        cache
            .put(&by_id, &CachedEmployees::One(ana.clone()))
            .await
            .expect("put");
        for key in [&first_page, &second_page] {
            cache
                .put(key, &CachedEmployees::Many(vec![ana.clone()]))
                .await
                .expect("put");
        }

        cache
            .evict_namespace(CacheNamespace::Pages)
            .await
            .expect("evict");

        assert_eq!(cache.get(&first_page).await.expect("get"), None);
        assert_eq!(cache.get(&second_page).await.expect("get"), None);
        assert!(cache.get(&by_id).await.expect("get").is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn evict_removes_single_key(clock: Arc<MutableClock>, ana: Employee) {
        let cache = cache(&clock);
        let key = EmployeeCacheKey::by_id(ana.id());
        cache
            .put(&key, &CachedEmployees::One(ana))
            .await
            .expect("put");
        cache.evict(&key).await.expect("evict");
        assert_eq!(cache.len(), 0);
    }
}
