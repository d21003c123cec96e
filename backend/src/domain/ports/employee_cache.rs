//! Driven port for caching employee reads.
//!
//! Keys are structured so adapters can evict a whole namespace at once: one
//! namespace holds single records by id, the other holds listing pages.

use std::fmt;

use async_trait::async_trait;
use pagination::PageRequest;
use serde::{Deserialize, Serialize};

use super::define_port_error;
use crate::domain::{Employee, EmployeeId};

/// Prefix shared by every employee cache key. Bump the version when the
/// cached value shape changes.
pub const EMPLOYEE_CACHE_PREFIX: &str = "employees:v1";

define_port_error! {
    /// Errors surfaced by cache adapters.
    pub enum EmployeeCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "employee cache backend failure: {message}",
        /// Cached content could not be encoded or decoded.
        Serialization { message: String } => "employee cache serialisation failed: {message}",
    }
}

/// Group of keys evicted together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    ById,
    Pages,
}

impl CacheNamespace {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ById => "by-id",
            Self::Pages => "pages",
        }
    }
}

/// Key for one cached value.
///
/// # Examples
/// ```
/// use employee_backend::domain::ports::EmployeeCacheKey;
/// use pagination::PageRequest;
///
/// let key = EmployeeCacheKey::page(PageRequest::new(2, 10).unwrap());
/// assert_eq!(key.to_string(), "employees:v1:pages:2:10");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmployeeCacheKey {
    namespace: CacheNamespace,
    discriminator: String,
}

impl EmployeeCacheKey {
    pub fn by_id(id: EmployeeId) -> Self {
        Self {
            namespace: CacheNamespace::ById,
            discriminator: id.to_string(),
        }
    }

    pub fn page(page: PageRequest) -> Self {
        Self {
            namespace: CacheNamespace::Pages,
            discriminator: format!("{}:{}", page.page(), page.size()),
        }
    }

    pub fn namespace(&self) -> CacheNamespace {
        self.namespace
    }

    /// Part of the key that follows the namespace.
    pub fn discriminator(&self) -> &str {
        self.discriminator.as_str()
    }
}

impl fmt::Display for EmployeeCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{EMPLOYEE_CACHE_PREFIX}:{}:{}",
            self.namespace.as_str(),
            self.discriminator
        )
    }
}

/// Cached payload: a single record or a page of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CachedEmployees {
    One(Employee),
    Many(Vec<Employee>),
}

/// Cache contract used by the employee service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeCache: Send + Sync {
    async fn get(&self, key: &EmployeeCacheKey)
    -> Result<Option<CachedEmployees>, EmployeeCacheError>;

    async fn put(
        &self,
        key: &EmployeeCacheKey,
        value: &CachedEmployees,
    ) -> Result<(), EmployeeCacheError>;

    async fn evict(&self, key: &EmployeeCacheKey) -> Result<(), EmployeeCacheError>;

    /// Drop every entry in `namespace`.
    async fn evict_namespace(&self, namespace: CacheNamespace) -> Result<(), EmployeeCacheError>;
}
