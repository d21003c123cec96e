//! Driven port used by readiness probes to check the backing store.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failure reported by a store health check.
    pub enum StoreHealthError {
        Unavailable { message: String } => "employee store unavailable: {message}",
    }
}

/// Cheap liveness check against the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), StoreHealthError>;
}

/// Health check for stores that live in process and cannot be down.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysHealthy;

#[async_trait]
impl StoreHealth for AlwaysHealthy {
    async fn ping(&self) -> Result<(), StoreHealthError> {
        Ok(())
    }
}
