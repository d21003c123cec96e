//! Service configuration loaded via OrthoConfig.
//!
//! Every value can come from a CLI flag, an `EMPLOYEES_*` environment
//! variable or a configuration file. Fields stay optional so the accessors
//! below own the defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::resilience::ResilienceConfig;
use crate::inbound::http::session_config::SessionToggles;
use crate::outbound::cache::{CacheTtl, DEFAULT_CACHE_TTL};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 8080;

/// Top-level settings for the employee service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EMPLOYEES")]
pub struct AppSettings {
    /// Address the HTTP listener binds to.
    pub host: Option<IpAddr>,
    /// Port the HTTP listener binds to.
    pub port: Option<u16>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Largest number of pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Idle connections the pool keeps open.
    pub db_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub db_connection_timeout_secs: Option<u64>,
    /// Redis URL; the in-memory cache is used when absent.
    pub redis_url: Option<String>,
    /// Cache entry lifetime in seconds, before jitter.
    pub cache_ttl_secs: Option<u64>,
    /// Disable to bypass caching entirely.
    #[ortho_config(default = true)]
    pub cache_enabled: bool,
    pub max_attempts: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
    pub circuit_failure_threshold: Option<u32>,
    pub circuit_open_cooldown_secs: Option<u64>,
    pub rate_limit_per_period: Option<u32>,
    pub rate_limit_period_ms: Option<u64>,
    pub max_concurrent_calls: Option<usize>,
    pub bulkhead_wait_ms: Option<u64>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    pub session_cookie_secure: Option<bool>,
    /// `SameSite` policy: `Strict`, `Lax` or `None`.
    pub session_same_site: Option<String>,
    /// Permit a generated key when the key file is unreadable.
    pub session_allow_ephemeral: Option<bool>,
}

impl AppSettings {
    /// Socket address for the HTTP listener, `0.0.0.0:8080` by default.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(DEFAULT_HOST),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Pool tuning for the configured database, if any.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?;
        let mut config = PoolConfig::new(url)
            .with_max_size(self.db_max_connections.unwrap_or(PoolConfig::DEFAULT_MAX_SIZE))
            .with_min_idle(Some(
                self.db_min_idle.unwrap_or(PoolConfig::DEFAULT_MIN_IDLE),
            ));
        if let Some(secs) = self.db_connection_timeout_secs {
            config = config.with_connection_timeout(Duration::from_secs(secs));
        }
        Some(config)
    }

    /// Cache entry lifetime with jitter.
    pub fn cache_ttl(&self) -> CacheTtl {
        CacheTtl::new(
            self.cache_ttl_secs
                .map_or(DEFAULT_CACHE_TTL, Duration::from_secs),
        )
    }

    /// Resilience tuning, falling back to [`ResilienceConfig::default`] per
    /// field.
    pub fn resilience_config(&self) -> ResilienceConfig {
        let defaults = ResilienceConfig::default();
        let millis = |value: Option<u64>, fallback: Duration| {
            value.map_or(fallback, Duration::from_millis)
        };
        ResilienceConfig {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            initial_backoff: millis(self.initial_backoff_ms, defaults.initial_backoff),
            max_backoff: millis(self.max_backoff_ms, defaults.max_backoff),
            circuit_failure_threshold: self
                .circuit_failure_threshold
                .unwrap_or(defaults.circuit_failure_threshold),
            circuit_open_cooldown: self
                .circuit_open_cooldown_secs
                .map_or(defaults.circuit_open_cooldown, Duration::from_secs),
            rate_limit_per_period: self
                .rate_limit_per_period
                .unwrap_or(defaults.rate_limit_per_period),
            rate_limit_period: millis(self.rate_limit_period_ms, defaults.rate_limit_period),
            max_concurrent_calls: self
                .max_concurrent_calls
                .unwrap_or(defaults.max_concurrent_calls),
            bulkhead_wait: millis(self.bulkhead_wait_ms, defaults.bulkhead_wait),
        }
    }

    /// Raw session toggles for [`crate::inbound::http::session_config`].
    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self.session_key_file.clone(),
            cookie_secure: self.session_cookie_secure,
            same_site: self.session_same_site.clone(),
            allow_ephemeral: self.session_allow_ephemeral,
        }
    }
}
