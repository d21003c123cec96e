//! Builders for the adapters and services behind the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use employee_backend::domain::EmployeeService;
use employee_backend::domain::ports::{
    AlwaysHealthy, EmployeeCache, EmployeeRepository, FixtureLoginService, StoreHealth,
};
use employee_backend::domain::resilience::ResiliencePolicy;
use employee_backend::inbound::http::health::HealthState;
use employee_backend::inbound::http::state::HttpState;
use employee_backend::outbound::cache::{InMemoryEmployeeCache, NoOpEmployeeCache, RedisEmployeeCache};
use employee_backend::outbound::memory::InMemoryEmployeeRepository;
use employee_backend::outbound::persistence::{DieselEmployeeRepository, DieselStoreHealth};
use employee_backend::settings::AppSettings;

use super::ServerConfig;

const EMPLOYEE_POLICY: &str = "employees";

/// Choose the employee cache from settings.
///
/// Disabled caching wins over a configured Redis URL; without either the
/// process-local cache is used.
///
/// # Errors
/// Returns [`std::io::Error`] when the Redis pool cannot be built.
pub async fn build_cache(settings: &AppSettings) -> std::io::Result<Arc<dyn EmployeeCache>> {
    if !settings.cache_enabled {
        info!("employee cache disabled");
        return Ok(Arc::new(NoOpEmployeeCache));
    }
    let ttl = settings.cache_ttl();
    match settings.redis_url.as_deref() {
        Some(url) => {
            let cache = RedisEmployeeCache::connect(url, ttl)
                .await
                .map_err(|err| std::io::Error::other(format!("redis cache: {err}")))?;
            info!(ttl_secs = ttl.base().as_secs(), "using redis employee cache");
            Ok(Arc::new(cache))
        }
        None => {
            info!(ttl_secs = ttl.base().as_secs(), "using in-memory employee cache");
            Ok(Arc::new(InMemoryEmployeeCache::new(Arc::new(DefaultClock), ttl)))
        }
    }
}

/// Readiness state that pings the database when one is configured.
pub fn build_health_state(config: &ServerConfig) -> web::Data<HealthState> {
    let store: Arc<dyn StoreHealth> = match &config.db_pool {
        Some(pool) => Arc::new(DieselStoreHealth::new(pool.clone())),
        None => Arc::new(AlwaysHealthy),
    };
    web::Data::new(HealthState::new(store))
}

fn build_repository(config: &ServerConfig) -> Arc<dyn EmployeeRepository> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselEmployeeRepository::new(pool.clone())),
        None => {
            warn!("no database configured; employees are kept in memory");
            Arc::new(InMemoryEmployeeRepository::new())
        }
    }
}

/// Wire the employee service and login port into handler state.
pub fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let policy = Arc::new(ResiliencePolicy::new(
        EMPLOYEE_POLICY,
        config.resilience.clone(),
        clock.clone(),
    ));
    let service = Arc::new(EmployeeService::new(
        build_repository(config),
        config.cache.clone(),
        clock,
        policy,
    ));
    web::Data::new(HttpState::new(
        Arc::new(FixtureLoginService),
        service.clone(),
        service,
    ))
}
