//! User data model.
//!
//! Stored users carry an Argon2id hash; every read path hands out a
//! [`UserProfile`], which has no password field at all.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{PasswordHash, PlainPassword, Role};

/// Maximum length of an email address.
pub const EMAIL_MAX: usize = 254;
/// Maximum length of a first or last name.
pub const NAME_MAX: usize = 50;

/// Which name field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    /// `firstName`
    FirstName,
    /// `lastName`
    LastName,
}

impl NameField {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
        }
    }
}

impl fmt::Display for NameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors raised by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// Identifier is not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Email is blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email does not look like `local@domain.tld`.
    #[error("email must be a valid email address")]
    InvalidEmail,
    /// Email exceeds [`EMAIL_MAX`].
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Allowed maximum.
        max: usize,
    },
    /// Name is blank.
    #[error("{field} must not be empty")]
    EmptyName {
        /// Offending field.
        field: NameField,
    },
    /// Name exceeds [`NAME_MAX`].
    #[error("{field} must be at most {max} characters")]
    NameTooLong {
        /// Offending field.
        field: NameField,
        /// Allowed maximum.
        max: usize,
    },
    /// Password below the minimum length.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Required minimum.
        min: usize,
    },
    /// Password above the maximum length.
    #[error("password must be at most {max} characters")]
    PasswordTooLong {
        /// Allowed maximum.
        max: usize,
    },
}

impl UserValidationError {
    /// Wire name of the field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyEmail | Self::InvalidEmail | Self::EmailTooLong { .. } => "email",
            Self::EmptyName { field } | Self::NameTooLong { field, .. } => field.as_str(),
            Self::PasswordTooShort { .. } | Self::PasswordTooLong { .. } => "password",
        }
    }

    /// Stable machine-readable code for error details.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::EmptyEmail | Self::EmptyName { .. } => "empty",
            Self::InvalidEmail => "invalid_email",
            Self::EmailTooLong { .. } | Self::NameTooLong { .. } | Self::PasswordTooLong { .. } => {
                "too_long"
            }
            Self::PasswordTooShort { .. } => "too_short",
        }
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its canonical string form.
    ///
    /// # Errors
    /// Returns [`UserValidationError::InvalidId`] when `raw` is not a UUID or
    /// carries surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = raw.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; deliverability is out of scope.
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address, compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    ///
    /// # Errors
    /// Returns the first failing rule as a [`UserValidationError`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if raw.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&raw) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(raw))
    }

    /// Borrow the address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// First or last name of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a name for `field`.
    ///
    /// # Errors
    /// Returns [`UserValidationError::EmptyName`] for blank input and
    /// [`UserValidationError::NameTooLong`] beyond [`NAME_MAX`] characters.
    pub fn new(field: NameField, raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName { field });
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                field,
                max: NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User as exposed to clients and list queries; carries no password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    id: UserId,
    email: Email,
    role: Role,
    first_name: PersonName,
    last_name: PersonName,
}

impl UserProfile {
    /// Assemble a profile from validated parts.
    #[must_use]
    pub const fn new(
        id: UserId,
        email: Email,
        role: Role,
        first_name: PersonName,
        last_name: PersonName,
    ) -> Self {
        Self {
            id,
            email,
            role,
            first_name,
            last_name,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Unique email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Privilege level.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Given name.
    #[must_use]
    pub const fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    /// Family name.
    #[must_use]
    pub const fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    /// Overwrite the profile fields present in `patch`.
    #[must_use]
    pub fn merged(self, patch: &UserPatch) -> Self {
        Self {
            id: self.id,
            email: patch.email.clone().unwrap_or(self.email),
            role: patch.role.unwrap_or(self.role),
            first_name: patch.first_name.clone().unwrap_or(self.first_name),
            last_name: patch.last_name.clone().unwrap_or(self.last_name),
        }
    }
}

/// Stored user: profile plus password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    profile: UserProfile,
    password_hash: PasswordHash,
}

impl User {
    /// Pair a profile with its password hash.
    #[must_use]
    pub const fn new(profile: UserProfile, password_hash: PasswordHash) -> Self {
        Self {
            profile,
            password_hash,
        }
    }

    /// Password-free view.
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Drop the hash, keeping the profile.
    #[must_use]
    pub fn into_profile(self) -> UserProfile {
        self.profile
    }

    /// Stored Argon2id hash.
    #[must_use]
    pub const fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        self.profile.id()
    }

    /// Privilege level.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.profile.role()
    }
}

/// Validated payload for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique email address.
    pub email: Email,
    /// Cleartext password, hashed before storage.
    pub password: PlainPassword,
    /// Requested role.
    pub role: Role,
    /// Given name.
    pub first_name: PersonName,
    /// Family name.
    pub last_name: PersonName,
}

/// Validated partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    /// New email address.
    pub email: Option<Email>,
    /// New password, re-hashed before storage.
    pub password: Option<PlainPassword>,
    /// New role.
    pub role: Option<Role>,
    /// New given name.
    pub first_name: Option<PersonName>,
    /// New family name.
    pub last_name: Option<PersonName>,
}

/// Authenticated caller of a user administration operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    id: UserId,
    role: Role,
}

impl Requester {
    /// Build a requester from a loaded identity.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Requester's own identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Requester's privilege level.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Whether `target` is visible to and manageable by this requester.
    #[must_use]
    pub const fn can_manage(&self, target: Role) -> bool {
        !target.outranks(self.role)
    }
}

/// Target of a per-user operation, already checked against the requester.
///
/// Only the user administration service produces values of this type, so
/// holding one proves the lookup and rank checks passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUser(User);

impl ResolvedUser {
    pub(crate) const fn new(user: User) -> Self {
        Self(user)
    }

    /// Resolved user's identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        self.0.id()
    }

    /// Password-free view of the resolved user.
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        self.0.profile()
    }

    /// Take the stored user.
    #[must_use]
    pub fn into_user(self) -> User {
        self.0
    }
}

#[cfg(test)]
mod tests;
