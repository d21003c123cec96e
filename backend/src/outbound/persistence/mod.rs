//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Row structs (`models.rs`) and the table definition (`schema.rs`) stay
//! private to this module; only the adapters, the pool and the migration
//! runner are exported. Queries run on `diesel-async` connections checked
//! out of a `bb8` pool.
//!
//! # Example
//!
//! ```no_run
//! use employee_backend::outbound::persistence::{
//!     DbPool, DieselEmployeeRepository, PoolConfig, run_migrations,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://localhost/employees";
//! run_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let repository = DieselEmployeeRepository::new(pool);
//! # let _ = repository;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_employee_repository;
mod diesel_store_health;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_employee_repository::DieselEmployeeRepository;
pub use diesel_store_health::DieselStoreHealth;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
