//! PostgreSQL-backed `RecordRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::ports::{RecordPersistenceError, RecordRepository};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::records;

/// Diesel-backed implementation of the [`RecordRepository`] port.
#[derive(Clone)]
pub struct DieselRecordRepository {
    pool: DbPool,
}

impl DieselRecordRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordRepository for DieselRecordRepository {
    async fn delete_by_owner(&self, owner: &UserId) -> Result<u64, RecordPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(records::table.filter(records::user_id.eq(owner.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        u64::try_from(deleted).map_err(|_| RecordPersistenceError::query("deleted row count overflow"))
    }
}
