//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;
use tracing::debug;

use crate::domain::Error;

pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// JSON extractor configuration shared by every body-accepting route.
///
/// Unreadable bodies become `invalid_request` errors so clients see the same
/// error envelope as for field validation failures.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "rejected request body");
        Error::invalid_request(format!("invalid JSON body: {err}")).into()
    })
}
