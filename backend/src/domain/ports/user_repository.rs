//! Port abstraction for user persistence adapters and their errors.
//!
//! List queries are described by a [`UserFilter`] (who is excluded) and a
//! [`Window`] (which slice of the ordered result to return). Adapters order
//! users by creation time, then id, so windows are stable across calls.
//! Reads that feed responses return [`UserProfile`], the password-free
//! projection.
use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Email, Requester, Role, User, UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection {
            /// Underlying cause.
            message: String,
        } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query {
            /// Underlying cause.
            message: String,
        } => "user repository query failed: {message}",
        /// The email is already stored for another user.
        DuplicateEmail => "user email already exists",
    }
}

/// Selection applied before windowing a user list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// User left out of the result, typically the requester.
    pub excluding: Option<UserId>,
    /// Only users whose role the given role may manage.
    pub manageable_by: Option<Role>,
}

impl UserFilter {
    /// Users a requester may see: everyone else at or below their rank.
    #[must_use]
    pub const fn visible_to(requester: &Requester) -> Self {
        Self {
            excluding: Some(*requester.id()),
            manageable_by: Some(requester.role()),
        }
    }

    /// Whether `profile` passes the filter.
    #[must_use]
    pub fn matches(&self, profile: &UserProfile) -> bool {
        let excluded = self.excluding.as_ref() == Some(profile.id());
        let outranked = self
            .manageable_by
            .is_some_and(|role| profile.role().outranks(role));
        !excluded && !outranked
    }
}

/// Skip/limit slice of an ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Rows to skip.
    pub skip: u64,
    /// Maximum rows to return.
    pub limit: u64,
}

impl From<PageRequest> for Window {
    fn from(request: PageRequest) -> Self {
        Self {
            skip: request.offset(),
            limit: request.limit(),
        }
    }
}

/// Storage for users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch one window of filtered profiles in creation order.
    async fn list_page(
        &self,
        filter: &UserFilter,
        window: Window,
    ) -> Result<Vec<UserProfile>, UserPersistenceError>;

    /// Count every profile matching `filter`, ignoring windows.
    async fn count(&self, filter: &UserFilter) -> Result<u64, UserPersistenceError>;

    /// Fetch a user, including the password hash, by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the profile owning `email`, if any.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserProfile>, UserPersistenceError>;

    /// Store a new user.
    ///
    /// Adapters report a taken email as
    /// [`UserPersistenceError::DuplicateEmail`].
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Overwrite an existing user.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Remove a user; returns whether a row was deleted.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}
