//! Recordkeeper backend library.
//!
//! A hexagonal user administration service: [`domain`] holds the user model,
//! role hierarchy and the [`domain::UserAdminService`]; [`inbound`] exposes it
//! over Actix Web; [`outbound`] provides PostgreSQL and in-memory
//! repositories.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
