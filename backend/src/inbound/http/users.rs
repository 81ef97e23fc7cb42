//! User administration HTTP handlers.
//!
//! ```text
//! GET    /api/v1/users?page=1&rowsPerPage=5
//! POST   /api/v1/users
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Every route requires a session. Per-user routes resolve the target before
//! looking at the body, so an unknown or outranking target wins over a
//! malformed payload.

use actix_web::{delete, get, post, put, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Email, Error, NameField, NewUser, PersonName, PlainPassword, Requester, Role, UserPatch,
    UserProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    missing_field_error, pagination_error, role_error, user_validation_error,
};

/// Pagination query for `GET /api/v1/users`.
///
/// Values stay raw strings so non-integer input can be answered with a
/// `422` rather than a generic deserialisation failure.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    /// One-based page number. Defaults to 1.
    pub page: Option<String>,
    /// Page size. Defaults to 5.
    pub rows_per_page: Option<String>,
}

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Login email, unique across users.
    pub email: Option<String>,
    /// Plain-text password; hashed before storage.
    pub password: Option<String>,
    /// `admin`, `manager` or `user`. Defaults to `user`.
    pub role: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
}

/// Request body for `PUT /api/v1/users/{id}`.
///
/// Only supplied fields change.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Replacement email.
    pub email: Option<String>,
    /// Replacement password.
    pub password: Option<String>,
    /// Replacement role.
    pub role: Option<String>,
    /// Replacement given name.
    pub first_name: Option<String>,
    /// Replacement family name.
    pub last_name: Option<String>,
}

/// A user as returned by the API. Never carries the password.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User id (UUID).
    pub id: String,
    /// Login email.
    pub email: String,
    /// Role name.
    #[schema(value_type = String, example = "manager")]
    pub role: Role,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl From<UserProfile> for UserResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            id: value.id().to_string(),
            email: value.email().as_str().to_owned(),
            role: value.role(),
            first_name: value.first_name().as_str().to_owned(),
            last_name: value.last_name().as_str().to_owned(),
        }
    }
}

/// One page of users plus the size of the whole visible set.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsersPageResponse {
    /// Users on this page.
    pub users: Vec<UserResponse>,
    /// Number of visible users across all pages.
    pub count: u64,
}

/// Response body for `DELETE /api/v1/users/{id}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedUserResponse {
    /// Id of the removed user.
    pub id: String,
}

fn parse_email(raw: String) -> Result<Email, Error> {
    Email::new(raw).map_err(|err| user_validation_error(&err))
}

fn parse_password(raw: String) -> Result<PlainPassword, Error> {
    PlainPassword::new(raw).map_err(|err| user_validation_error(&err))
}

fn parse_role(raw: &str) -> Result<Role, Error> {
    raw.parse().map_err(|err| role_error(&err))
}

fn parse_name(field: NameField, raw: String) -> Result<PersonName, Error> {
    PersonName::new(field, raw).map_err(|err| user_validation_error(&err))
}

fn parse_create_request(payload: CreateUserRequest) -> Result<NewUser, Error> {
    let email = payload.email.ok_or_else(|| missing_field_error("email"))?;
    let password = payload
        .password
        .ok_or_else(|| missing_field_error("password"))?;
    let first_name = payload
        .first_name
        .ok_or_else(|| missing_field_error("firstName"))?;
    let last_name = payload
        .last_name
        .ok_or_else(|| missing_field_error("lastName"))?;

    Ok(NewUser {
        email: parse_email(email)?,
        password: parse_password(password)?,
        role: payload
            .role
            .as_deref()
            .map_or(Ok(Role::User), parse_role)?,
        first_name: parse_name(NameField::FirstName, first_name)?,
        last_name: parse_name(NameField::LastName, last_name)?,
    })
}

fn parse_update_request(payload: UpdateUserRequest) -> Result<UserPatch, Error> {
    Ok(UserPatch {
        email: payload.email.map(parse_email).transpose()?,
        password: payload.password.map(parse_password).transpose()?,
        role: payload.role.as_deref().map(parse_role).transpose()?,
        first_name: payload
            .first_name
            .map(|raw| parse_name(NameField::FirstName, raw))
            .transpose()?,
        last_name: payload
            .last_name
            .map(|raw| parse_name(NameField::LastName, raw))
            .transpose()?,
    })
}

async fn current_requester(state: &HttpState, session: &SessionContext) -> Result<Requester, Error> {
    let id = session.require_user_id()?;
    state.users.requester(&id).await
}

/// List users the caller may manage, excluding the caller.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = UsersPageResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 422, description = "Pagination values are not positive integers", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<UsersPageResponse>> {
    let user_id = session.require_user_id()?;
    let query = query.into_inner();
    let page = PageRequest::parse(query.page.as_deref(), query.rows_per_page.as_deref())
        .map_err(pagination_error)?;
    let requester = state.users.requester(&user_id).await?;

    let page = state
        .users
        .list(&requester, page)
        .await?
        .map(UserResponse::from);
    Ok(web::Json(UsersPageResponse {
        count: page.count,
        users: page.items,
    }))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Created user", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Role above the caller's own", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let requester = current_requester(&state, &session).await?;
    let new_user = parse_create_request(payload.into_inner())?;
    let created = state.users.create(&requester, new_user).await?;
    Ok(web::Json(UserResponse::from(created)))
}

/// Fetch a single user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Target outranks the caller", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let requester = current_requester(&state, &session).await?;
    let target = state.users.resolve_target(&requester, &path).await?;
    Ok(web::Json(UserResponse::from(state.users.read(&target))))
}

/// Update the supplied fields of a user.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Target or role outranks the caller", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let requester = current_requester(&state, &session).await?;
    let target = state.users.resolve_target(&requester, &path).await?;
    let patch = parse_update_request(payload.into_inner())?;
    let updated = state.users.update(&requester, target, patch).await?;
    Ok(web::Json(UserResponse::from(updated)))
}

/// Delete a user together with every record they own.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Removed user id", body = DeletedUserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Target outranks the caller", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedUserResponse>> {
    let requester = current_requester(&state, &session).await?;
    let target = state.users.resolve_target(&requester, &path).await?;
    let id = state.users.remove(target).await?;
    Ok(web::Json(DeletedUserResponse { id: id.to_string() }))
}
