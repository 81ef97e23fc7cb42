//! Driving port for user administration.
//!
//! HTTP handlers call this port to manage users on behalf of an
//! authenticated [`Requester`]. Per-user operations take a [`ResolvedUser`],
//! obtained from [`UserAdministration::resolve_target`], so the lookup and
//! rank checks always run before the target is read or changed.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, NewUser, Requester, ResolvedUser, UserId, UserPatch, UserProfile};

/// Outcome of [`UserAdministration::ensure_admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminBootstrap {
    /// A new administrator was stored.
    Created(UserId),
    /// A user already holds the email; nothing was written.
    AlreadyPresent(UserId),
}

impl AdminBootstrap {
    /// Identifier of the user holding the bootstrap email.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        match self {
            Self::Created(id) | Self::AlreadyPresent(id) => id,
        }
    }
}

/// User administration use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// Load the caller identified by a session user id.
    ///
    /// Unknown ids yield an `unauthorized` error.
    async fn requester(&self, id: &UserId) -> Result<Requester, Error>;

    /// List users visible to `requester`, one page at a time.
    async fn list(
        &self,
        requester: &Requester,
        page: PageRequest,
    ) -> Result<Page<UserProfile>, Error>;

    /// Create a user after uniqueness and role checks.
    async fn create(&self, requester: &Requester, user: NewUser) -> Result<UserProfile, Error>;

    /// Look up the target of a per-user operation from its raw path id.
    async fn resolve_target(&self, requester: &Requester, id: &str)
    -> Result<ResolvedUser, Error>;

    /// Password-free view of a resolved target.
    fn read(&self, target: &ResolvedUser) -> UserProfile;

    /// Apply `patch` to a resolved target.
    async fn update(
        &self,
        requester: &Requester,
        target: ResolvedUser,
        patch: UserPatch,
    ) -> Result<UserProfile, Error>;

    /// Delete a resolved target and every record it owns.
    async fn remove(&self, target: ResolvedUser) -> Result<UserId, Error>;

    /// Store `admin` as an administrator unless its email is already taken.
    ///
    /// Runs at startup, before any requester exists, so no rank checks
    /// apply. The role carried by `admin` is ignored.
    async fn ensure_admin(&self, admin: NewUser) -> Result<AdminBootstrap, Error>;
}
