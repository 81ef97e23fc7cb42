//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::UserAdministration;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User administration use cases.
    pub users: Arc<dyn UserAdministration>,
}

impl HttpState {
    /// Bundle the given ports.
    #[must_use]
    pub fn new(users: Arc<dyn UserAdministration>) -> Self {
        Self { users }
    }
}
