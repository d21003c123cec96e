//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use employee_backend::domain::ports::EmployeeCache;
use employee_backend::domain::resilience::ResilienceConfig;
use employee_backend::outbound::cache::NoOpEmployeeCache;
use employee_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) cache: Arc<dyn EmployeeCache>,
    pub(crate) resilience: ResilienceConfig,
}

impl ServerConfig {
    /// Construct a server configuration with no database, no cache and
    /// default resilience tuning.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            cache: Arc::new(NoOpEmployeeCache),
            resilience: ResilienceConfig::default(),
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, the server stores employees in PostgreSQL and the
    /// readiness probe pings it; otherwise employees live in memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Replace the employee cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn EmployeeCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the resilience tuning applied to every employee operation.
    #[must_use]
    pub fn with_resilience(mut self, resilience: ResilienceConfig) -> Self {
        self.resilience = resilience;
        self
    }
}
