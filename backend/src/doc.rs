//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the user administration and health endpoints plus
//! the error envelope schemas. The document backs Swagger UI in debug builds
//! and is exported by the `openapi-dump` binary.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{
    CreateUserRequest, DeletedUserResponse, UpdateUserRequest, UserResponse, UsersPageResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie carrying the caller's user id.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recordkeeper API",
        description = "User administration with role-scoped visibility, plus health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CreateUserRequest,
        UpdateUserRequest,
        UserResponse,
        UsersPageResponse,
        DeletedUserResponse,
    )),
    tags(
        (name = "users", description = "User administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
