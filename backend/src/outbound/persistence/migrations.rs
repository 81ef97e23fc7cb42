//! Embedded schema migrations.
//!
//! Migrations run over a synchronous `PgConnection` on the blocking pool,
//! since `diesel_migrations` has no async harness.

use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::TraceId;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failures raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// Could not open the migration connection.
    #[error("failed to connect for migrations: {message}")]
    Connect {
        /// Underlying cause.
        message: String,
    },
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply {
        /// Underlying cause.
        message: String,
    },
    /// The blocking worker did not complete.
    #[error("migration worker failed: {message}")]
    Worker {
        /// Underlying cause.
        message: String,
    },
}

/// Apply every pending migration, returning how many ran.
///
/// # Errors
/// Returns a [`MigrationError`] describing the failing stage.
pub async fn run_pending_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let url = database_url.to_owned();
    let applied = TraceId::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&url).map_err(|err| MigrationError::Connect {
            message: err.to_string(),
        })?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|err| MigrationError::Apply {
                message: err.to_string(),
            })
    })
    .await
    .map_err(|err| MigrationError::Worker {
        message: err.to_string(),
    })??;

    info!(applied, "database migrations applied");
    Ok(applied)
}
