//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repository and health ping using Diesel
//! - **memory**: in-process repository for database-less runs and tests
//! - **cache**: in-memory, Redis and no-op employee caches
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod memory;
pub mod persistence;
