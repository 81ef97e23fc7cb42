//! Builders wiring repositories into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use recordkeeper::domain::ports::{AdminBootstrap, UserAdministration};
use recordkeeper::domain::{Error, NewUser, UserAdminService};
use recordkeeper::inbound::http::state::HttpState;
use recordkeeper::outbound::memory::{InMemoryRecordRepository, InMemoryUserRepository};
use recordkeeper::outbound::persistence::{DieselRecordRepository, DieselUserRepository};

use super::ServerConfig;

/// Build the user administration service over PostgreSQL when a pool is
/// configured, otherwise over in-memory stores.
fn build_user_administration(config: &ServerConfig) -> Arc<dyn UserAdministration> {
    match &config.db_pool {
        Some(pool) => Arc::new(UserAdminService::new(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselRecordRepository::new(pool.clone())),
        )),
        None => {
            warn!("no database configured; users are kept in memory and lost on restart");
            Arc::new(UserAdminService::new(
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryRecordRepository::new()),
            ))
        }
    }
}

/// Shared handler state for every worker.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(build_user_administration(config)))
}

/// Make sure the configured bootstrap administrator exists.
pub(super) async fn seed_bootstrap_admin(
    state: &HttpState,
    admin: NewUser,
) -> Result<AdminBootstrap, Error> {
    let outcome = state.users.ensure_admin(admin).await?;
    match outcome {
        AdminBootstrap::Created(id) => info!(user = %id, "seeded bootstrap administrator"),
        AdminBootstrap::AlreadyPresent(id) => {
            info!(user = %id, "bootstrap administrator already present");
        }
    }
    Ok(outcome)
}
