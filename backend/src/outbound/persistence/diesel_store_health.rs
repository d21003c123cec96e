//! Readiness ping against PostgreSQL.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use super::pool::DbPool;
use crate::domain::ports::{StoreHealth, StoreHealthError};

/// Runs `SELECT 1` on a pooled connection.
#[derive(Clone)]
pub struct DieselStoreHealth {
    pool: DbPool,
}

impl DieselStoreHealth {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreHealth for DieselStoreHealth {
    async fn ping(&self) -> Result<(), StoreHealthError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| StoreHealthError::unavailable(err.to_string()))?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(|err| StoreHealthError::unavailable(err.to_string()))?;
        Ok(())
    }
}
