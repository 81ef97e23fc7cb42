//! Domain primitives, ports and services.
//!
//! Purpose: Define strongly typed user entities and the administration use
//! cases built on them. Adapters in `inbound` and `outbound` depend on this
//! module; it depends on neither.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - User / UserProfile — stored user and its password-free projection.
//! - Role — privilege hierarchy.
//! - UserAdminService — implementation of the user administration port.

pub mod error;
mod password;
pub mod ports;
mod role;
mod trace_id;
mod user;
mod user_admin;

pub use self::error::{Error, ErrorCode, RuleViolation};
pub use self::password::{PASSWORD_MAX, PASSWORD_MIN, PasswordError, PasswordHash, PlainPassword};
pub use self::role::{Role, RoleParseError};
pub use self::trace_id::TraceId;
pub use self::user::{
    EMAIL_MAX, Email, NAME_MAX, NameField, NewUser, PersonName, Requester, ResolvedUser, User,
    UserId, UserPatch, UserProfile, UserValidationError,
};
pub use self::user_admin::UserAdminService;

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";

