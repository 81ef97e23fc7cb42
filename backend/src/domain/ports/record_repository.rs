//! Port for the record storage touched by user removal.
use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by record repository adapters.
    pub enum RecordPersistenceError {
        /// Repository connection could not be established.
        Connection {
            /// Underlying cause.
            message: String,
        } => "record repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query {
            /// Underlying cause.
            message: String,
        } => "record repository query failed: {message}",
    }
}

/// Storage for records owned by users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Delete every record owned by `owner`, returning how many went.
    async fn delete_by_owner(&self, owner: &UserId) -> Result<u64, RecordPersistenceError>;
}
