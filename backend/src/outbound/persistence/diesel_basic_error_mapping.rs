//! Shared Diesel error mapping for repository adapters.
//!
//! Each repository error type describes how to build its connection and
//! query variants, and optionally how to report a unique-key violation.
//! The mapping then stays identical across adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{RecordPersistenceError, UserPersistenceError};

use super::pool::PoolError;

/// Unique index guarding user emails.
pub(crate) const USERS_EMAIL_KEY: &str = "users_email_key";

/// Repository error types the shared mapping can produce.
pub(crate) trait BasicPersistenceError: Sized {
    /// Connection-level failure.
    fn from_connection(message: String) -> Self;

    /// Query-level failure.
    fn from_query(message: String) -> Self;

    /// Typed error for a violated unique constraint, if the adapter has one.
    fn from_unique_violation(_constraint: Option<&str>) -> Option<Self> {
        None
    }
}

impl BasicPersistenceError for UserPersistenceError {
    fn from_connection(message: String) -> Self {
        Self::connection(message)
    }

    fn from_query(message: String) -> Self {
        Self::query(message)
    }

    fn from_unique_violation(constraint: Option<&str>) -> Option<Self> {
        // Older servers omit the constraint name; email is the only unique
        // key besides the primary key, which is generated server side.
        match constraint {
            None | Some(USERS_EMAIL_KEY) => Some(Self::duplicate_email()),
            Some(_) => None,
        }
    }
}

impl BasicPersistenceError for RecordPersistenceError {
    fn from_connection(message: String) -> Self {
        Self::connection(message)
    }

    fn from_query(message: String) -> Self {
        Self::query(message)
    }
}

/// Map pool errors into the repository's connection variant.
pub(crate) fn map_pool_error<E: BasicPersistenceError>(error: PoolError) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    E::from_connection(message)
}

/// Map Diesel errors into repository errors, logging the failure kind.
pub(crate) fn map_diesel_error<E: BasicPersistenceError>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            E::from_unique_violation(info.constraint_name())
                .unwrap_or_else(|| E::from_query("unique constraint violated".to_owned()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::from_connection("database connection error".to_owned())
        }
        DieselError::NotFound => E::from_query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::from_query("database query error".to_owned()),
        _ => E::from_query("database error".to_owned()),
    }
}
