//! User administration service.
//!
//! Implements [`UserAdministration`] on top of the user and record
//! repositories. Every operation follows the same gatekeeping order: the
//! target lookup and rank check first, then email uniqueness, then the role
//! assignment rule, and only then any write.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    AdminBootstrap, RecordPersistenceError, RecordRepository, UserAdministration, UserFilter,
    UserPersistenceError, UserRepository, Window,
};
use crate::domain::{
    Email, Error, NewUser, PasswordError, PasswordHash, Requester, ResolvedUser, Role,
    RuleViolation, User, UserId, UserPatch, UserProfile,
};

/// User administration service implementing the driving port.
#[derive(Clone)]
pub struct UserAdminService<U, R> {
    users: Arc<U>,
    records: Arc<R>,
}

impl<U, R> UserAdminService<U, R> {
    /// Create a new service with the given repositories.
    pub const fn new(users: Arc<U>, records: Arc<R>) -> Self {
        Self { users, records }
    }
}

impl<U, R> UserAdminService<U, R>
where
    U: UserRepository,
    R: RecordRepository,
{
    fn map_user_error(err: UserPersistenceError) -> Error {
        match err {
            UserPersistenceError::Connection { message } => {
                error!(%message, "user repository unavailable");
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                error!(%message, "user repository query failed");
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail => {
                debug!("email uniqueness enforced by storage");
                RuleViolation::USER_ALREADY_REGISTERED.into()
            }
        }
    }

    fn map_record_error(err: RecordPersistenceError) -> Error {
        match err {
            RecordPersistenceError::Connection { message } => {
                error!(%message, "record repository unavailable");
                Error::service_unavailable(format!("record repository unavailable: {message}"))
            }
            RecordPersistenceError::Query { message } => {
                error!(%message, "record repository query failed");
                Error::internal(format!("record repository error: {message}"))
            }
        }
    }

    fn map_password_error(err: PasswordError) -> Error {
        error!(error = %err, "password hashing failed");
        Error::internal(err.to_string())
    }

    /// Reject `email` when a user other than `owner` already holds it.
    async fn ensure_email_free(&self, email: &Email, owner: Option<&UserId>) -> Result<(), Error> {
        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(Self::map_user_error)?;
        match existing {
            Some(profile) if Some(profile.id()) != owner => {
                debug!(existing = %profile.id(), "email already registered");
                Err(RuleViolation::USER_ALREADY_REGISTERED.into())
            }
            _ => Ok(()),
        }
    }

    fn ensure_can_assign(requester: &Requester, role: Role) -> Result<(), Error> {
        if requester.role().can_assign(role) {
            Ok(())
        } else {
            debug!(requester = %requester.id(), %role, "role assignment above own rank");
            Err(RuleViolation::UNAUTHORIZED.into())
        }
    }
}

#[async_trait]
impl<U, R> UserAdministration for UserAdminService<U, R>
where
    U: UserRepository,
    R: RecordRepository,
{
    async fn requester(&self, id: &UserId) -> Result<Requester, Error> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(Self::map_user_error)?;
        match user {
            Some(user) => Ok(Requester::new(*user.id(), user.role())),
            None => {
                debug!(user = %id, "session user no longer exists");
                Err(Error::unauthorized("login required"))
            }
        }
    }

    async fn list(
        &self,
        requester: &Requester,
        page: PageRequest,
    ) -> Result<Page<UserProfile>, Error> {
        let filter = UserFilter::visible_to(requester);
        let items = self
            .users
            .list_page(&filter, Window::from(page))
            .await
            .map_err(Self::map_user_error)?;
        let count = self
            .users
            .count(&filter)
            .await
            .map_err(Self::map_user_error)?;
        Ok(Page::new(items, count))
    }

    async fn create(&self, requester: &Requester, user: NewUser) -> Result<UserProfile, Error> {
        self.ensure_email_free(&user.email, None).await?;
        Self::ensure_can_assign(requester, user.role)?;

        let hash = PasswordHash::derive(&user.password)
            .await
            .map_err(Self::map_password_error)?;
        let profile = UserProfile::new(
            UserId::random(),
            user.email,
            user.role,
            user.first_name,
            user.last_name,
        );
        let stored = User::new(profile, hash);
        self.users
            .insert(&stored)
            .await
            .map_err(Self::map_user_error)?;

        info!(user = %stored.id(), role = %stored.role(), by = %requester.id(), "user created");
        Ok(stored.into_profile())
    }

    async fn resolve_target(
        &self,
        requester: &Requester,
        id: &str,
    ) -> Result<ResolvedUser, Error> {
        let Ok(id) = UserId::new(id) else {
            debug!("target id is not a UUID");
            return Err(RuleViolation::NOT_FOUND.into());
        };
        let user = self
            .users
            .find_by_id(&id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| {
                debug!(target = %id, "target user not found");
                Error::from(RuleViolation::NOT_FOUND)
            })?;
        if !requester.can_manage(user.role()) {
            debug!(requester = %requester.id(), target = %id, "target outranks requester");
            return Err(RuleViolation::UNAUTHORIZED.into());
        }
        Ok(ResolvedUser::new(user))
    }

    fn read(&self, target: &ResolvedUser) -> UserProfile {
        target.profile().clone()
    }

    async fn update(
        &self,
        requester: &Requester,
        target: ResolvedUser,
        patch: UserPatch,
    ) -> Result<UserProfile, Error> {
        if let Some(email) = patch.email.as_ref() {
            self.ensure_email_free(email, Some(target.id())).await?;
        }
        if let Some(role) = patch.role {
            Self::ensure_can_assign(requester, role)?;
        }

        let current = target.into_user();
        let hash = match patch.password.as_ref() {
            Some(password) => PasswordHash::derive(password)
                .await
                .map_err(Self::map_password_error)?,
            None => current.password_hash().clone(),
        };
        let updated = User::new(current.into_profile().merged(&patch), hash);
        self.users
            .update(&updated)
            .await
            .map_err(Self::map_user_error)?;

        info!(user = %updated.id(), by = %requester.id(), "user updated");
        Ok(updated.into_profile())
    }

    async fn remove(&self, target: ResolvedUser) -> Result<UserId, Error> {
        let id = *target.id();
        let removed_records = self
            .records
            .delete_by_owner(&id)
            .await
            .map_err(Self::map_record_error)?;
        let deleted = self
            .users
            .delete(&id)
            .await
            .map_err(Self::map_user_error)?;
        if !deleted {
            debug!(user = %id, "user vanished before delete");
            return Err(RuleViolation::NOT_FOUND.into());
        }

        info!(user = %id, removed_records, "user removed");
        Ok(id)
    }

    async fn ensure_admin(&self, admin: NewUser) -> Result<AdminBootstrap, Error> {
        if let Some(existing) = self
            .users
            .find_by_email(&admin.email)
            .await
            .map_err(Self::map_user_error)?
        {
            if existing.role() != Role::Admin {
                warn!(
                    user = %existing.id(),
                    role = %existing.role(),
                    "bootstrap email belongs to a non-admin user; leaving it unchanged"
                );
            }
            debug!(user = %existing.id(), "bootstrap administrator already present");
            return Ok(AdminBootstrap::AlreadyPresent(*existing.id()));
        }

        let hash = PasswordHash::derive(&admin.password)
            .await
            .map_err(Self::map_password_error)?;
        let profile = UserProfile::new(
            UserId::random(),
            admin.email,
            Role::Admin,
            admin.first_name,
            admin.last_name,
        );
        let stored = User::new(profile, hash);
        match self.users.insert(&stored).await {
            Ok(()) => {
                info!(user = %stored.id(), "bootstrap administrator created");
                Ok(AdminBootstrap::Created(*stored.id()))
            }
            // Another replica seeded the same email first.
            Err(UserPersistenceError::DuplicateEmail) => self
                .users
                .find_by_email(stored.profile().email())
                .await
                .map_err(Self::map_user_error)?
                .map(|existing| AdminBootstrap::AlreadyPresent(*existing.id()))
                .ok_or_else(|| Error::internal("bootstrap administrator vanished after insert")),
            Err(err) => Err(Self::map_user_error(err)),
        }
    }
}

#[cfg(test)]
#[path = "user_admin_tests.rs"]
mod tests;
