//! Redis-backed employee cache.
//!
//! Values are stored as JSON under keys of the form
//! `employees:v1:{namespace}:g{generation}:{discriminator}`. Each namespace
//! keeps a generation counter at `employees:v1:{namespace}:generation`;
//! evicting a namespace increments it, so older entries are never read again
//! and expire on their own TTL.

use async_trait::async_trait;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::{RedisConnectionManager, bb8};
use tracing::debug;

use super::CacheTtl;
use crate::domain::ports::{
    CacheNamespace, CachedEmployees, EMPLOYEE_CACHE_PREFIX, EmployeeCache, EmployeeCacheError,
    EmployeeCacheKey,
};

type RedisPool = bb8::Pool<RedisConnectionManager>;
type RedisConnection<'a> = bb8::PooledConnection<'a, RedisConnectionManager>;

fn generation_key(namespace: CacheNamespace) -> String {
    format!("{EMPLOYEE_CACHE_PREFIX}:{}:generation", namespace.as_str())
}

fn entry_key(key: &EmployeeCacheKey, generation: u64) -> String {
    format!(
        "{EMPLOYEE_CACHE_PREFIX}:{}:g{generation}:{}",
        key.namespace().as_str(),
        key.discriminator()
    )
}

fn backend_error(err: impl std::fmt::Display) -> EmployeeCacheError {
    EmployeeCacheError::backend(err.to_string())
}

/// Employee cache on a pooled Redis connection.
#[derive(Clone)]
pub struct RedisEmployeeCache {
    pool: RedisPool,
    ttl: CacheTtl,
}

impl RedisEmployeeCache {
    /// Build a lazily connecting pool for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`EmployeeCacheError::Backend`] when the URL is invalid.
    pub async fn connect(url: &str, ttl: CacheTtl) -> Result<Self, EmployeeCacheError> {
        let manager = RedisConnectionManager::new(url).map_err(backend_error)?;
        let pool = bb8::Pool::builder()
            .build(manager)
            .await
            .map_err(backend_error)?;
        Ok(Self::from_pool(pool, ttl))
    }

    pub fn from_pool(pool: RedisPool, ttl: CacheTtl) -> Self {
        Self { pool, ttl }
    }

    async fn connection(&self) -> Result<RedisConnection<'_>, EmployeeCacheError> {
        self.pool.get().await.map_err(backend_error)
    }

    async fn generation(
        conn: &mut RedisConnection<'_>,
        namespace: CacheNamespace,
    ) -> Result<u64, EmployeeCacheError> {
        let current: Option<u64> = conn
            .get(generation_key(namespace))
            .await
            .map_err(backend_error)?;
        Ok(current.unwrap_or(0))
    }
}

#[async_trait]
impl EmployeeCache for RedisEmployeeCache {
    async fn get(
        &self,
        key: &EmployeeCacheKey,
    ) -> Result<Option<CachedEmployees>, EmployeeCacheError> {
        let mut conn = self.connection().await?;
        let generation = Self::generation(&mut conn, key.namespace()).await?;
        let raw: Option<String> = conn
            .get(entry_key(key, generation))
            .await
            .map_err(backend_error)?;
        raw.map(|payload| {
            serde_json::from_str(&payload)
                .map_err(|err| EmployeeCacheError::serialization(err.to_string()))
        })
        .transpose()
    }

    async fn put(
        &self,
        key: &EmployeeCacheKey,
        value: &CachedEmployees,
    ) -> Result<(), EmployeeCacheError> {
        let payload = serde_json::to_string(value)
            .map_err(|err| EmployeeCacheError::serialization(err.to_string()))?;
        let ttl_secs = self.ttl.sample().as_secs().max(1);
        let mut conn = self.connection().await?;
        let generation = Self::generation(&mut conn, key.namespace()).await?;
        let () = conn
            .set_ex(entry_key(key, generation), payload, ttl_secs)
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn evict(&self, key: &EmployeeCacheKey) -> Result<(), EmployeeCacheError> {
        let mut conn = self.connection().await?;
        let generation = Self::generation(&mut conn, key.namespace()).await?;
        let () = conn
            .del(entry_key(key, generation))
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn evict_namespace(&self, namespace: CacheNamespace) -> Result<(), EmployeeCacheError> {
        let mut conn = self.connection().await?;
        let generation: u64 = conn
            .incr(generation_key(namespace), 1_u64)
            .await
            .map_err(backend_error)?;
        debug!(namespace = namespace.as_str(), generation, "cache namespace rolled");
        Ok(())
    }
}
