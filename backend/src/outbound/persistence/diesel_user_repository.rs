//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Email uniqueness is enforced by the `users_email_key` index; a violation
//! surfaces as [`UserPersistenceError::DuplicateEmail`] so a create racing
//! another create still reports a conflict.

use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserFilter, UserPersistenceError, UserRepository, Window};
use crate::domain::{
    Email, NameField, PasswordHash, PersonName, Role, User, UserId, UserProfile,
};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, ProfileRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupt(column: &str, err: &impl std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(format!("stored {column} is invalid: {err}"))
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = UserPersistenceError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Self::new(
            UserId::from_uuid(row.id),
            Email::new(row.email).map_err(|err| corrupt("email", &err))?,
            Role::from_ordinal(row.role).map_err(|err| corrupt("role", &err))?,
            PersonName::new(NameField::FirstName, row.first_name)
                .map_err(|err| corrupt("first_name", &err))?,
            PersonName::new(NameField::LastName, row.last_name)
                .map_err(|err| corrupt("last_name", &err))?,
        ))
    }
}

impl TryFrom<UserRow> for User {
    type Error = UserPersistenceError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let hash =
            PasswordHash::from_phc(row.password_hash).map_err(|err| corrupt("password_hash", &err))?;
        let profile = UserProfile::try_from(ProfileRow {
            id: row.id,
            email: row.email,
            role: row.role,
            first_name: row.first_name,
            last_name: row.last_name,
        })?;
        Ok(Self::new(profile, hash))
    }
}

fn filtered(filter: &UserFilter) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table.into_boxed();
    if let Some(id) = filter.excluding {
        query = query.filter(users::id.ne(*id.as_uuid()));
    }
    if let Some(role) = filter.manageable_by {
        // Higher ordinals are less privileged.
        query = query.filter(users::role.ge(role.ordinal()));
    }
    query
}

fn to_sql_bound(value: u64) -> Result<i64, UserPersistenceError> {
    i64::try_from(value).map_err(|_| UserPersistenceError::query("page window out of range"))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list_page(
        &self,
        filter: &UserFilter,
        window: Window,
    ) -> Result<Vec<UserProfile>, UserPersistenceError> {
        let offset = to_sql_bound(window.skip)?;
        let limit = to_sql_bound(window.limit)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProfileRow> = filtered(filter)
            .order((users::created_at.asc(), users::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(UserProfile::try_from).collect()
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        u64::try_from(total).map_err(|err| corrupt("count", &err))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProfileRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let profile = user.profile();
        let row = NewUserRow {
            id: *profile.id().as_uuid(),
            email: profile.email().as_str(),
            password_hash: user.password_hash().as_str(),
            role: profile.role().ordinal(),
            first_name: profile.first_name().as_str(),
            last_name: profile.last_name().as_str(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let profile = user.profile();
        let changes = UserChangeset {
            email: profile.email().as_str(),
            password_hash: user.password_hash().as_str(),
            role: profile.role().ordinal(),
            first_name: profile.first_name().as_str(),
            last_name: profile.last_name().as_str(),
            updated_at: Utc::now(),
        };

        let updated = diesel::update(users::table.find(profile.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(UserPersistenceError::query("user not found for update"));
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage.
    use super::*;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    #[fixture]
    fn row() -> ProfileRow {
        ProfileRow {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_owned(),
            role: 1,
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
        }
    }

    #[rstest]
    fn profile_rows_convert_to_domain(row: ProfileRow) {
        let id = row.id;
        let profile = UserProfile::try_from(row).expect("valid row");
        assert_eq!(profile.id().as_uuid(), &id);
        assert_eq!(profile.role(), Role::Manager);
        assert_eq!(profile.email().as_str(), "ada@example.com");
    }

    #[rstest]
    fn unknown_role_ordinals_are_query_errors(mut row: ProfileRow) {
        row.role = 9;
        let err = UserProfile::try_from(row).expect_err("bad role");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn malformed_hashes_are_query_errors(row: ProfileRow) {
        let full = UserRow {
            id: row.id,
            email: row.email,
            password_hash: "plaintext".to_owned(),
            role: row.role,
            first_name: row.first_name,
            last_name: row.last_name,
        };
        let err = User::try_from(full).expect_err("bad hash");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn oversized_windows_are_rejected() {
        assert!(to_sql_bound(u64::MAX).is_err());
        assert_eq!(to_sql_bound(25).expect("fits"), 25);
    }
}
