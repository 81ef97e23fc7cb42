//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::users;

/// Full user row, including the password hash.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: i16,
    pub first_name: String,
    pub last_name: String,
}

/// Password-free projection used by list and email lookups.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub role: i16,
    pub first_name: String,
    pub last_name: String,
}

/// Insertable struct for creating new user rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: i16,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Changeset overwriting every mutable user column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: i16,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub updated_at: DateTime<Utc>,
}
