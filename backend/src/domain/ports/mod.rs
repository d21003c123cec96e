//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`EmployeeQuery`], [`EmployeeCommand`], [`LoginService`])
//! are called by inbound adapters. Driven ports ([`EmployeeRepository`],
//! [`EmployeeCache`], [`StoreHealth`]) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod employee_cache;
mod employee_command;
mod employee_query;
mod employee_repository;
mod login_service;
mod store_health;

#[cfg(test)]
pub use employee_cache::MockEmployeeCache;
pub use employee_cache::{
    CacheNamespace, CachedEmployees, EMPLOYEE_CACHE_PREFIX, EmployeeCache, EmployeeCacheError,
    EmployeeCacheKey,
};
#[cfg(test)]
pub use employee_command::MockEmployeeCommand;
pub use employee_command::EmployeeCommand;
#[cfg(test)]
pub use employee_query::MockEmployeeQuery;
pub use employee_query::EmployeeQuery;
#[cfg(test)]
pub use employee_repository::MockEmployeeRepository;
pub use employee_repository::{EmployeeRepository, EmployeeRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FIXTURE_EMPLOYEE_SUBJECT, FixtureLoginService, LoginService};
#[cfg(test)]
pub use store_health::MockStoreHealth;
pub use store_health::{AlwaysHealthy, StoreHealth, StoreHealthError};
